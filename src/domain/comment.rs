/// An existing comment on an issue or pull request thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueComment {
    pub id: u64,
    pub author: Option<String>,
    pub body: Option<String>,
}

impl IssueComment {
    pub fn is_authored_by(&self, bot_name: &str) -> bool {
        !bot_name.is_empty()
            && self
                .author
                .as_deref()
                .is_some_and(|login| login.contains(bot_name))
    }
}
