pub mod scripted_landmark_detector;
