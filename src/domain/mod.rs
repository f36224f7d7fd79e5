pub mod feed_item;
