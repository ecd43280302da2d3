pub mod png_capture_encoder;
