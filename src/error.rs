use thiserror::Error;

use crate::db::enums::InterfaceKind;

/// A configuration conflict detected before or during a link operation.
/// Any of these aborts the whole operation; nothing is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollisionError {
    #[error("conflicting application name \"{0}\" found")]
    ApplicationName(String),

    #[error("conflicting item key \"{0}\" found")]
    ItemKey(String),

    #[error("trigger \"{0}\" has items from template \"{1}\"")]
    TriggerSpansTemplates(String, String),

    #[error("trigger \"{0}\" in template \"{1}\" has dependency from trigger \"{2}\" in template \"{3}\"")]
    DependencyOutsideSet(String, String, String, String),

    #[error("template with graph \"{0}\" already linked to the host")]
    GraphName(String),

    #[error("template with web scenario \"{0}\" already linked to the host")]
    ScenarioName(String),

    #[error("two items cannot populate one host inventory field")]
    InventoryField,

    #[error("graph prototype and real graph \"{0}\" have the same name")]
    GraphPrototypeName(String),

    #[error("graph \"{0}\" already exists on the host (items are not identical)")]
    GraphItemsDiffer(String),

    #[error("item prototype and real item \"{0}\" have the same key")]
    ItemPrototypeKey(String),

    #[error("cannot find \"{0}\" host interface")]
    MissingInterface(InterfaceKind),

    #[error("cannot find any interfaces on host")]
    NoInterfaces,
}

/// Failures raised by the configuration store itself.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("no {0} row with id {1}")]
    UnknownId(&'static str, u64),

    #[error("no transaction in progress")]
    NoTransaction,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Collision(#[from] CollisionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
