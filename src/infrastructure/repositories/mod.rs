pub mod feed_item_repository;

pub use feed_item_repository::FeedItemRepository;
