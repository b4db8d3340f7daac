/// A joint name that does not exist in the model.
///
/// Wrong joint names are a caller bug, so lookups never silently no-op.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown joint `{name}`")]
pub struct UnknownJointError {
    pub name: String,
}

/// Errors from building or querying an articulated model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("duplicate link `{0}`")]
    DuplicateLink(String),
    #[error("duplicate joint `{0}`")]
    DuplicateJoint(String),
    #[error("joint `{joint}` references unknown link `{link}`")]
    UnknownLink { joint: String, link: String },
    #[error("link `{link}` is the child of both `{first}` and `{second}`")]
    MultipleParents {
        link: String,
        first: String,
        second: String,
    },
    #[error("model has no root link")]
    NoRoot,
    #[error("model has several root links: {0:?}")]
    MultipleRoots(Vec<String>),
    #[error("link `{0}` is not reachable from the root")]
    Unreachable(String),
    #[error("joint `{0}` has a zero-length axis")]
    DegenerateAxis(String),
    #[error("joint `{joint}` has an invalid limit [{lower}, {upper}]")]
    InvalidLimit { joint: String, lower: f32, upper: f32 },
    #[error("world transforms are stale; recompute before querying")]
    StaleTransforms,
    #[error(transparent)]
    UnknownJoint(#[from] UnknownJointError),
}
