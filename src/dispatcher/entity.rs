use crate::controller::{ActionResult, Params};
use crate::error::DispatchError;
use crate::handler_spec::{HandlerSpec, ParseOptions};
use crate::router::MatchParams;
use serde_json::Value;
use ulid::Ulid;

/// Lifecycle of a [`DispatchEntity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// No handler yet
    Created,
    /// Handler and parameters set, ready to dispatch
    Configured,
    /// Result captured; the entity cannot be dispatched again
    Dispatched,
}

/// One dispatch: which handler runs, with which parameters, and what came
/// back. Created per request and discarded once the response is built.
#[derive(Debug, Clone)]
pub struct DispatchEntity {
    id: Ulid,
    state: DispatchState,
    handler: Option<HandlerSpec>,
    params: Params,
    published: Params,
    result: Option<ActionResult>,
}

impl Default for DispatchEntity {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchEntity {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Ulid::new(),
            state: DispatchState::Created,
            handler: None,
            params: Params::new(),
            published: Params::new(),
            result: None,
        }
    }

    /// Configure from a match: parses `_controller` and copies every
    /// parameter (reserved keys included) as a string value
    pub fn from_match(params: &MatchParams, options: &ParseOptions) -> Result<Self, DispatchError> {
        let notation = params.controller().ok_or_else(|| {
            DispatchError::invalid_handler(
                "",
                format!(
                    "route '{}' declares no controller",
                    params.route_name().unwrap_or_default()
                ),
            )
        })?;
        let mut entity = Self::new();
        entity.configure(notation, options);
        entity.extend_params(
            params
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string()))),
        );
        Ok(entity)
    }

    /// Parse the handler notation; moves the entity to `Configured`
    pub fn configure(&mut self, notation: &str, options: &ParseOptions) -> &mut Self {
        self.set_handler(HandlerSpec::parse_with(notation, options))
    }

    pub fn set_handler(&mut self, handler: HandlerSpec) -> &mut Self {
        if self.state != DispatchState::Dispatched {
            self.handler = Some(handler);
            self.state = DispatchState::Configured;
        }
        self
    }

    /// Set or override a caller parameter
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn extend_params<I>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        self.params.extend(params);
        self
    }

    #[must_use]
    pub fn id(&self) -> Ulid {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> DispatchState {
        self.state
    }

    #[must_use]
    pub fn handler(&self) -> Option<&HandlerSpec> {
        self.handler.as_ref()
    }

    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        self.handler.as_ref().map(|h| h.class_name.as_str())
    }

    #[must_use]
    pub fn method_name(&self) -> Option<&str> {
        self.handler.as_ref().map(|h| h.method_name.as_str())
    }

    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Parameters the controller published for the view layer
    #[must_use]
    pub fn published(&self) -> &Params {
        &self.published
    }

    #[must_use]
    pub fn published_param(&self, name: &str) -> Option<&Value> {
        self.published.get(name)
    }

    /// Result of the dispatch; `None` until `Dispatched`
    #[must_use]
    pub fn result(&self) -> Option<&ActionResult> {
        self.result.as_ref()
    }

    /// Take the result out, leaving `None` behind
    pub fn take_result(&mut self) -> Option<ActionResult> {
        self.result.take()
    }

    pub(crate) fn publish(&mut self, published: serde_json::Map<String, Value>) {
        self.published.extend(published);
    }

    pub(crate) fn complete(&mut self, result: ActionResult) {
        self.result = Some(result);
        self.state = DispatchState::Dispatched;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        let mut entity = DispatchEntity::new();
        assert_eq!(entity.state(), DispatchState::Created);
        assert!(entity.class_name().is_none());

        entity.configure("Users:show", &ParseOptions::default());
        assert_eq!(entity.state(), DispatchState::Configured);
        assert_eq!(entity.class_name(), Some("Users"));
        assert_eq!(entity.method_name(), Some("showAction"));

        entity.complete(ActionResult::Empty);
        assert_eq!(entity.state(), DispatchState::Dispatched);

        // A dispatched entity keeps its handler
        entity.configure("Other", &ParseOptions::default());
        assert_eq!(entity.class_name(), Some("Users"));
        assert_eq!(entity.state(), DispatchState::Dispatched);
    }

    #[test]
    fn test_from_match_copies_params() {
        let params: MatchParams = [("_controller", "Users:show"), ("_route", "u"), ("id", "42")]
            .into_iter()
            .collect();
        let entity = DispatchEntity::from_match(&params, &ParseOptions::default()).unwrap();
        assert_eq!(entity.handler(), Some(&HandlerSpec::new("Users", "showAction")));
        assert_eq!(entity.params()["id"], Value::String("42".into()));
        assert_eq!(entity.params()["_route"], Value::String("u".into()));
    }

    #[test]
    fn test_from_match_without_controller_is_invalid_handler() {
        let params: MatchParams = [("_route", "orphan")].into_iter().collect();
        let err = DispatchEntity::from_match(&params, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidHandler { .. }));
        assert!(err.to_string().contains("orphan"));
    }

    #[test]
    fn test_overrides_replace_matched_params() {
        let params: MatchParams = [("_controller", "A"), ("id", "1")].into_iter().collect();
        let mut entity = DispatchEntity::from_match(&params, &ParseOptions::default()).unwrap();
        entity.set_param("id", 2);
        assert_eq!(entity.params()["id"], Value::from(2));
    }
}
