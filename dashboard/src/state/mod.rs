pub mod devscore;
pub mod github;

pub use devscore::{DevScore, DevScoreState, LoadStatus, MintStatus};
pub use github::{GithubLink, GithubLinkState};

pub use crate::guard::Update;
