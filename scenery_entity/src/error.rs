// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for scene operations.

use thiserror::Error;

use crate::entity::EntityId;

/// Errors returned by [`Scene`](crate::Scene) and [`ComponentRegistry`](crate::ComponentRegistry).
///
/// Malformed attribute text is never an error; bad fragments are dropped
/// during parsing and the property falls back to a lower-precedence layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// A component was attached before a component it depends on.
    #[error("{component} on {entity} requires {dependency}, which is not attached")]
    MissingDependency {
        /// Entity the attach was attempted on.
        entity: EntityId,
        /// Component being attached.
        component: String,
        /// Required component that is missing.
        dependency: String,
    },

    /// A component name was registered twice.
    #[error("component {0} is already registered")]
    DuplicateComponent(String),

    /// A schema was rejected at registration.
    #[error("invalid schema for {component}: {reason}")]
    InvalidSchema {
        /// Component being registered.
        component: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The entity was removed or never existed.
    #[error("{0} is not a live entity")]
    StaleEntity(EntityId),

    /// The entity does not carry the addressed component.
    #[error("{component} is not attached to {entity}")]
    NotAttached {
        /// Entity addressed.
        entity: EntityId,
        /// Component addressed.
        component: String,
    },
}

/// Result type for scene operations.
pub type Result<T, E = SceneError> = core::result::Result<T, E>;
