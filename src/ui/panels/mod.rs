// ReqScope - ui/panels/mod.rs

pub mod content_view;
pub mod detail;
pub mod filters;
pub mod json_tree;
pub mod request_list;
