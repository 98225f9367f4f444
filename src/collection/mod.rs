mod codec;
pub mod record;
pub mod sharded;
pub mod single;

pub use codec::{Decoded, Undecodable};
pub use record::{Record, new_id};
pub use sharded::{ShardScheme, ShardedCollection};
pub use single::SingleCollection;
