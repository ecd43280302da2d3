pub mod shared {
    pub mod constants;
    pub mod dimensions;
    pub mod frame;
    pub mod video_metadata;
}

pub mod detection {
    pub mod domain {
        pub mod face_landmarks;
        pub mod landmark_detector;
    }
    pub mod infrastructure;
}

pub mod guidance {
    pub mod domain {
        pub mod alignment;
        pub mod brightness;
        pub mod geometry;
        pub mod guidance_config;
        pub mod guidance_session;
        pub mod guidance_state;
    }
}

pub mod capture {
    pub mod domain {
        pub mod capture_sink;
    }
    pub mod infrastructure;
}

pub mod feedback {
    pub mod domain {
        pub mod feedback_sink;
    }
    pub mod infrastructure;
}

pub mod video {
    pub mod domain {
        pub mod frame_source;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod face_positioning_use_case;
    pub mod guidance_logger;
    pub mod infrastructure;
}
