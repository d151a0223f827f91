pub mod service;
pub mod store;

pub use service::{
    CollectionList, CollectionResponse, CollectionService, ItemAction, ItemPage, ItemUpdate,
    SharedCollection,
};
