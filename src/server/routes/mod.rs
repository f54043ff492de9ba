pub mod authors;
pub mod quotes;
pub mod site;
