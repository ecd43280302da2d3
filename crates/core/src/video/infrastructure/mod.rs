pub mod landmark_trace;
pub mod trace_frame_source;
