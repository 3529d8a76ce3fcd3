//! Camera detection collaborator: the backend wire contract, a simulated
//! detector and a live feed for the interactive session.

pub mod feed;
pub mod protocol;
pub mod simulated;
