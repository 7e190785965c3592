pub mod frame_compositor;
pub mod matroska;
pub mod pcm;
pub mod sample_queue;
pub mod still;
pub mod zoom;
