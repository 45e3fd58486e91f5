pub mod command;
pub mod event;
pub mod producer;
pub mod render_loop;
pub mod session;
pub mod state;
pub mod step;
