pub mod log_feedback_sink;
