pub mod local_store;
pub mod naming;
pub mod stager;
pub mod submission;
