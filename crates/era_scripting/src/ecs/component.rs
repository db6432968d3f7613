//! Component trait and lifecycle
//!
//! A component mirrors a slice of native state for one entity. It owns no
//! physical state itself: `initialize` turns a parameter record into exactly
//! one bridge call and caches the parameters for later queries.
//!
//! ```text
//! Uninitialized --initialize ok--> Ready
//! Uninitialized --initialize err-> Uninitialized
//! Uninitialized | Ready --entity destroyed--> Disposed (terminal)
//! ```

use std::any::Any;

use thiserror::Error;

use super::components::{ColliderType, ComponentParams, ScriptValue};
use super::EntityHandle;
use crate::bridge::{BridgeError, NativeBridge, NativeCallOutcome};
use crate::logging::ScriptLogger;

/// Concrete kind of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// A physics collider of the given shape
    Collider(ColliderType),
}

/// Lifecycle state of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentState {
    /// Attached, waiting for `initialize`
    Uninitialized,
    /// Initialized; mirrored fields are valid
    Ready,
    /// The owning entity was destroyed natively
    Disposed,
}

impl ComponentState {
    /// Fail unless `initialize` may run
    pub const fn ensure_uninitialized(self) -> Result<(), ComponentError> {
        match self {
            Self::Uninitialized => Ok(()),
            Self::Ready => Err(ComponentError::AlreadyInitialized),
            Self::Disposed => Err(ComponentError::Disposed),
        }
    }

    /// Fail unless mirrored fields may be read
    pub const fn ensure_ready(self) -> Result<(), ComponentError> {
        match self {
            Self::Ready => Ok(()),
            Self::Uninitialized => Err(ComponentError::NotInitialized),
            Self::Disposed => Err(ComponentError::Disposed),
        }
    }
}

/// Component lifecycle and argument errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    /// Missing or wrong-typed initialization arguments
    #[error("argument error: {0}")]
    Argument(String),

    /// `initialize` already succeeded once
    #[error("component is already initialized")]
    AlreadyInitialized,

    /// Mirrored state was read before `initialize` succeeded
    #[error("component is not initialized")]
    NotInitialized,

    /// The owning entity has been destroyed
    #[error("component is disposed: its entity was destroyed")]
    Disposed,

    /// The bridge refused the native call
    #[error("native call failed: {0}")]
    Native(#[from] BridgeError),

    /// No component with that id is attached
    #[error("unknown component id")]
    UnknownComponent,

    /// The component exists but is not of the requested type
    #[error("component is a {actual:?}, not the requested type")]
    WrongType {
        /// Actual kind of the component
        actual: ComponentKind,
    },
}

/// What a component may touch while initializing
pub struct InitContext<'a> {
    /// Call surface to the engine
    pub bridge: &'a dyn NativeBridge,
    /// Diagnostics sink
    pub logger: &'a ScriptLogger,
}

/// Entity-attached behavior unit
pub trait Component: Any + Send {
    /// Owning entity
    fn entity(&self) -> EntityHandle;

    /// Concrete kind discriminator
    fn kind(&self) -> ComponentKind;

    /// Current lifecycle state
    fn state(&self) -> ComponentState;

    /// Create the native counterpart and cache `params`
    ///
    /// Issues exactly one bridge call on success and none when validation
    /// fails.
    fn initialize(
        &mut self,
        params: ComponentParams,
        ctx: &InitContext<'_>,
    ) -> Result<NativeCallOutcome, ComponentError>;

    /// Initialize from a loosely typed script argument list
    fn initialize_with_args(
        &mut self,
        args: &[ScriptValue],
        ctx: &InitContext<'_>,
    ) -> Result<NativeCallOutcome, ComponentError> {
        self.state().ensure_uninitialized()?;
        let params = ComponentParams::from_args(self.kind(), args)?;
        self.initialize(params, ctx)
    }

    /// Mark the component unusable after native entity destruction
    fn dispose(&mut self);

    /// Upcast for typed access
    fn as_any(&self) -> &dyn Any;

    /// Upcast for typed mutable access
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
