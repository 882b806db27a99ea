//! Name-addressed function surface consumed by clients
//!
//! Clients call `items:create` and friends with a JSON argument object. The
//! arguments are checked against the same validators the schema is written
//! with, then handed to the typed functions. Failures come back as
//! [`FunctionError`], whose text has the platform's stack-trace shape.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::RequestContext;
use crate::current_user::CurrentUserQuery;
use crate::error::{clean_error_message, Error, Result};
use crate::items::Items;
use crate::model::{ItemId, ItemPatch, NewItem};
use crate::schema::{v, Validator, ITEMS};

/// Whether a function reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Query,
    Mutation,
}

/// A callable function and the shape of its arguments
#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub path: &'static str,
    pub kind: FunctionKind,
    pub args: Validator,
}

/// Every function clients may call
pub fn registry() -> Vec<FunctionDef> {
    use FunctionKind::*;

    let def = |path: &'static str, kind: FunctionKind, fields: Vec<(&'static str, Validator)>| FunctionDef {
        path,
        kind,
        args: v::object(fields),
    };

    vec![
        def("items:list", Query, vec![]),
        def("items:listIncomplete", Query, vec![]),
        def(
            "items:create",
            Mutation,
            vec![("title", v::string()), ("description", v::optional(v::string()))],
        ),
        def(
            "items:update",
            Mutation,
            vec![
                ("id", v::id(ITEMS)),
                ("title", v::optional(v::string())),
                ("description", v::optional(v::string())),
                ("completed", v::optional(v::boolean())),
            ],
        ),
        def("items:remove", Mutation, vec![("id", v::id(ITEMS))]),
        def("currentUser:get", Query, vec![]),
    ]
}

/// A failed function call, rendered the way the platform reports it
#[derive(Debug, Error)]
#[error("[Request ID: {request_id}] Server Error Uncaught Error: {source} at handler ({path})")]
pub struct FunctionError {
    pub request_id: String,
    pub path: String,
    pub source: Error,
}

impl FunctionError {
    /// The message a client should show, stripped of the trace
    pub fn message(&self) -> String {
        clean_error_message(Some(&self.to_string()))
    }
}

#[derive(Deserialize)]
struct UpdateArgs {
    id: ItemId,
    #[serde(flatten)]
    patch: ItemPatch,
}

#[derive(Deserialize)]
struct RemoveArgs {
    id: ItemId,
}

/// Dispatches function calls by path
pub struct FunctionRouter {
    functions: Vec<FunctionDef>,
    items: Items,
    current_user: CurrentUserQuery,
}

impl FunctionRouter {
    /// Create a router over the app's functions
    pub fn new(items: Items, current_user: CurrentUserQuery) -> Self {
        Self {
            functions: registry(),
            items,
            current_user,
        }
    }

    /// Look up a function by path
    pub fn lookup(&self, path: &str) -> Option<&FunctionDef> {
        self.functions.iter().find(|f| f.path == path)
    }

    /// Call a function by path with JSON arguments
    pub async fn call(
        &self,
        ctx: &RequestContext,
        path: &str,
        args: Value,
    ) -> std::result::Result<Value, FunctionError> {
        self.dispatch(ctx, path, args).await.map_err(|source| {
            warn!(request_id = ctx.request_id(), path, error = %source, "function failed");
            FunctionError {
                request_id: ctx.request_id().to_string(),
                path: path.to_string(),
                source,
            }
        })
    }

    async fn dispatch(&self, ctx: &RequestContext, path: &str, args: Value) -> Result<Value> {
        let function = self
            .lookup(path)
            .ok_or_else(|| Error::validation(format!("Could not find public function for '{}'", path)))?;

        let args = if args.is_null() { json!({}) } else { args };
        function.args.validate(&args)?;
        debug!(request_id = ctx.request_id(), path, kind = ?function.kind, "calling function");

        match function.path {
            "items:list" => to_json(self.items.list(ctx).await?),
            "items:listIncomplete" => to_json(self.items.list_incomplete(ctx).await?),
            "items:create" => {
                let new_item: NewItem = parse(args)?;
                to_json(self.items.create(ctx, new_item).await?)
            }
            "items:update" => {
                let UpdateArgs { id, patch } = parse(args)?;
                self.items.update(ctx, &id, patch).await?;
                Ok(Value::Null)
            }
            "items:remove" => {
                let RemoveArgs { id } = parse(args)?;
                self.items.remove(ctx, &id).await?;
                Ok(Value::Null)
            }
            "currentUser:get" => to_json(self.current_user.get(ctx).await?),
            other => Err(Error::general(format!("no handler registered for {}", other))),
        }
    }
}

fn parse<T: DeserializeOwned>(args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| Error::validation(format!("ArgumentValidationError: {}", e)))
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}
