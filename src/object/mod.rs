//! Toolkit object model: classes, handles, signals, properties, widgets.
//!
//! This is the minimal single-threaded object system the inspector observes.
//! Objects are `Rc`-owned; the inspector only ever holds [`WeakObject`]s.

pub mod builder;
pub mod cell_layout;
pub mod class;
pub mod frame_clock;
pub mod handle;
pub mod property;
pub mod signal;
pub mod size_group;
pub mod widget;

pub use builder::ObjectBuilder;
pub use class::ClassTag;
pub use handle::{Object, ObjectId, ObjectRef, Slot, WeakNotifyId, WeakObject};
pub use property::{Property, PropertyError, Value};
pub use signal::{
    install_map_observer, map_observer_count, remove_map_observer, HandlerId, HookId,
    MapObserver, SignalKind, SignalPayload,
};
pub use size_group::SizeGroupMode;
pub use widget::{Allocation, Phase, StateFlags};
