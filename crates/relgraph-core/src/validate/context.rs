use crate::{
    config::ValidationConfig,
    error::{Issue, IssueKind, Issues, SchemaError, ValidationError},
    model::{EntityModel, RelationModel},
    schema::{EntityRef, Schema},
    validate::{Path, PathSegment},
};

///
/// ValidateContext
///
/// Per-call state: the current path, every issue found so far, the nesting
/// depth, and the first schema failure (which ends the call).
///

pub(crate) struct ValidateContext<'a> {
    pub(crate) schema: &'a Schema,
    pub(crate) config: &'a ValidationConfig,
    path: Path,
    issues: Issues,
    depth: usize,
    fatal: Option<SchemaError>,
}

impl<'a> ValidateContext<'a> {
    pub(crate) const fn new(schema: &'a Schema, config: &'a ValidationConfig) -> Self {
        Self {
            schema,
            config,
            path: Path::root(),
            issues: Issues::new(),
            depth: 0,
            fatal: None,
        }
    }

    // ------------------------------------------------------------------
    // Issues
    // ------------------------------------------------------------------

    /// Report an issue at the current path.
    pub(crate) fn issue(&mut self, kind: IssueKind, message: impl Into<String>) {
        self.issues.push(Issue {
            path: self.path.clone(),
            kind,
            message: message.into(),
        });
    }

    /// Report an issue one segment below the current path.
    pub(crate) fn issue_at(
        &mut self,
        seg: impl Into<PathSegment>,
        kind: IssueKind,
        message: impl Into<String>,
    ) {
        self.issues.push(Issue {
            path: self.path.child(seg.into()),
            kind,
            message: message.into(),
        });
    }

    /// Report a key that names nothing, unless unknown keys are stripped.
    pub(crate) fn unknown_key(&mut self, key: &str, expected: &str) {
        if self.config.is_strict() {
            self.issue_at(
                key,
                IssueKind::UnknownKey,
                format!("unknown key '{key}' (expected {expected})"),
            );
        }
    }

    pub(crate) const fn issue_count(&self) -> usize {
        self.issues.len()
    }

    /// Snapshot used with `failed_since` to tell whether a sub-parse failed.
    pub(crate) const fn mark(&self) -> usize {
        self.issues.len()
    }

    pub(crate) const fn failed_since(&self, mark: usize) -> bool {
        self.issues.len() > mark || self.fatal.is_some()
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    /// Run `f` one segment below the current path.
    pub(crate) fn at<R>(&mut self, seg: impl Into<PathSegment>, f: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push(seg.into());
        let out = f(self);
        self.path.pop();

        out
    }

    /// Run `f` one segment and one nesting level below the current position.
    ///
    /// Exceeding `max_depth` reports `DepthLimitExceeded` and skips `f`.
    pub(crate) fn nested<R>(
        &mut self,
        seg: impl Into<PathSegment>,
        f: impl FnOnce(&mut Self) -> Option<R>,
    ) -> Option<R> {
        self.at(seg, |ctx| {
            if ctx.depth >= ctx.config.max_depth {
                let max = ctx.config.max_depth;
                ctx.issue(
                    IssueKind::DepthLimitExceeded,
                    format!("nesting exceeds the maximum depth of {max}"),
                );
                return None;
            }

            ctx.depth += 1;
            let out = f(ctx);
            ctx.depth -= 1;

            out
        })
    }

    /// Reject lists longer than the configured maximum.
    pub(crate) fn check_list_len(&mut self, len: usize) -> bool {
        let max = self.config.max_list_len;
        if len > max {
            self.issue(
                IssueKind::InvalidValue,
                format!("list has {len} elements; the maximum is {max}"),
            );
            return false;
        }

        true
    }

    // ------------------------------------------------------------------
    // Schema
    // ------------------------------------------------------------------

    /// Resolve an entity. A failure is kept as the fatal error for this call.
    pub(crate) fn resolve(&mut self, entity: EntityRef) -> Option<&'a EntityModel> {
        match self.schema.resolve(entity) {
            Ok(model) => Some(model),
            Err(err) => {
                self.fatal.get_or_insert(err);
                None
            }
        }
    }

    pub(crate) fn target(&mut self, relation: &RelationModel) -> Option<&'a EntityModel> {
        self.resolve(relation.target)
    }

    /// Handle for an already-resolved model.
    pub(crate) fn entity_ref(&mut self, model: &EntityModel) -> Option<EntityRef> {
        match self.schema.lookup(model.name) {
            Ok(entity) => Some(entity),
            Err(err) => {
                self.fatal.get_or_insert(err);
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Result
    // ------------------------------------------------------------------

    pub(crate) fn finish<T>(self, value: Option<T>) -> Result<T, ValidationError> {
        if let Some(err) = self.fatal {
            return Err(ValidationError::Schema(err));
        }

        let mut issues = self.issues;
        match value {
            Some(value) if issues.is_empty() => Ok(value),
            _ => {
                // a stripped key must never surface as an empty failure
                if issues.is_empty() {
                    issues.push(Issue {
                        path: Path::root(),
                        kind: IssueKind::InvalidValue,
                        message: "input was rejected without a reported cause".to_string(),
                    });
                }

                Err(ValidationError::Invalid(issues))
            }
        }
    }
}
