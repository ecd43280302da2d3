pub mod threaded_frame_driver;
