pub mod comment;
pub mod commit;
pub mod pull_request;
pub mod table;
pub mod verdict;
