pub mod barrier;
pub mod capture_session;
pub mod recording;
pub mod render_loop;
