mod replicate_client;

pub use replicate_client::ReplicateClient;
