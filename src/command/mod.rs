// This software is released under the MIT license.
// See file LICENSE for full license details.
pub mod count;
pub mod threadcount;

pub use count::CountCMD;
pub use count::CountParams;
pub use count::DabseqCount;

pub use threadcount::determine_thread_count;
