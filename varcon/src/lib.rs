#[cfg(feature = "core")]
#[doc(inline)]
pub use varcon_core as core;

#[cfg(feature = "io")]
#[doc(inline)]
pub use varcon_io as io;

#[cfg(feature = "reconcile")]
#[doc(inline)]
pub use varcon_reconcile as reconcile;

#[cfg(feature = "merge")]
#[doc(inline)]
pub use varcon_merge as merge;

#[cfg(feature = "acmg")]
#[doc(inline)]
pub use varcon_acmg as acmg;

#[cfg(feature = "prio")]
#[doc(inline)]
pub use varcon_prio as prio;

#[cfg(feature = "pipeline")]
pub mod pipeline;
