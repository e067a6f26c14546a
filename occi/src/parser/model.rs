//! Two-pass linking of category declarations into a [`Model`].
//!
//! Declarations arrive in any order, so a kind may name a parent that has not
//! been seen yet. Such edges are parked in a pending map keyed by the missing
//! identifier and drained as soon as that identifier is declared. After the
//! last line the builtin kinds are added and drain their own waiters; any edge
//! still parked then is a linkage error.

use indexmap::IndexMap;
use regex::Captures;

use super::category;
use crate::error::ParseError;
use crate::grammar::CATEGORY_LINE;
use crate::model::{core_kinds, CategoryClass, Model};

type Pending = IndexMap<String, Vec<String>>;

/// Parses category lines into a model, all-or-nothing.
pub(super) fn parse(lines: &[String]) -> Result<Model, ParseError> {
    let mut builder = ModelBuilder::default();
    for line in lines {
        builder.add_line(line)?;
    }
    builder.finish()
}

#[derive(Default)]
struct ModelBuilder {
    model: Model,
    pending_kinds: Pending,
    pending_mixins: Pending,
}

impl ModelBuilder {
    fn add_line(&mut self, line: &str) -> Result<(), ParseError> {
        tracing::debug!(line, "matching line against category pattern");
        let caps = CATEGORY_LINE
            .captures(line)
            .ok_or_else(|| ParseError::InvalidLine(line.to_owned()))?;
        match category::class_of(&caps, line)? {
            CategoryClass::Kind => self.add_kind(&caps),
            CategoryClass::Mixin => self.add_mixin(&caps),
            CategoryClass::Action => {
                self.add_action(&caps);
                Ok(())
            }
        }
    }

    fn add_kind(&mut self, caps: &Captures<'_>) -> Result<(), ParseError> {
        let identifier = category::identifier_of(caps);
        if self.model.contains_kind(&identifier) {
            return Err(ParseError::DuplicateCategory(identifier));
        }
        let mut kind = category::kind_from(caps);
        if kind.location().is_none() {
            return Err(ParseError::MissingLocation(identifier));
        }

        for action in category::actions_of(caps) {
            self.ensure_action(action)?;
            kind.add_action(action);
        }

        for parent in category::relations_of(caps) {
            kind.declare_relation(parent);
            if self.model.contains_kind(parent) {
                tracing::debug!(kind = %identifier, parent, "linking kind relation");
                kind.resolve_relation(parent);
            } else {
                tracing::debug!(kind = %identifier, parent, "parking unknown kind relation");
                park(&mut self.pending_kinds, parent, &identifier);
            }
        }

        self.model.add_kind(kind);
        self.resolve_kinds(&identifier);
        Ok(())
    }

    fn add_mixin(&mut self, caps: &Captures<'_>) -> Result<(), ParseError> {
        let identifier = category::identifier_of(caps);
        if self.model.contains_mixin(&identifier) {
            return Err(ParseError::DuplicateCategory(identifier));
        }
        let mut mixin = category::mixin_from(caps);

        for action in category::actions_of(caps) {
            self.ensure_action(action)?;
            mixin.add_action(action);
        }

        for related in category::relations_of(caps) {
            mixin.add_relation(related);
            if self.model.contains_mixin(related) {
                tracing::debug!(mixin = %identifier, related, "linking mixin relation");
            } else {
                tracing::debug!(mixin = %identifier, related, "parking unknown mixin relation");
                park(&mut self.pending_mixins, related, &identifier);
            }
        }

        self.model.add_mixin(mixin);
        if let Some(waiting) = self.pending_mixins.shift_remove(&identifier) {
            for child in waiting {
                tracing::debug!(mixin = %child, related = %identifier, "resolving parked mixin relation");
            }
        }
        Ok(())
    }

    fn add_action(&mut self, caps: &Captures<'_>) {
        let action = category::action_from(caps);
        match self.model.action_mut(action.identifier()) {
            Some(known) => {
                tracing::debug!(action = action.identifier(), "merging action declaration");
                known.merge(action);
            }
            None => {
                self.model.add_action(action);
            }
        }
    }

    /// Registers a placeholder for an action referenced before its declaration.
    fn ensure_action(&mut self, identifier: &str) -> Result<(), ParseError> {
        if !self.model.contains_action(identifier) {
            tracing::debug!(action = identifier, "registering placeholder action");
            self.model.add_action(category::action_named(identifier)?);
        }
        Ok(())
    }

    fn resolve_kinds(&mut self, parent: &str) {
        let Some(waiting) = self.pending_kinds.shift_remove(parent) else {
            return;
        };
        for child in waiting {
            tracing::debug!(kind = %child, parent, "resolving parked kind relation");
            if let Some(kind) = self.model.kind_mut(&child) {
                kind.resolve_relation(parent);
            }
        }
    }

    fn finish(mut self) -> Result<Model, ParseError> {
        for kind in core_kinds() {
            let identifier = kind.identifier().to_owned();
            if self.model.add_kind(kind) {
                tracing::debug!(kind = %identifier, "added builtin kind");
            }
            self.resolve_kinds(&identifier);
        }

        if !self.pending_kinds.is_empty() {
            return Err(ParseError::UnresolvedKindRelations(
                self.pending_kinds.into_keys().collect(),
            ));
        }
        if !self.pending_mixins.is_empty() {
            return Err(ParseError::UnresolvedMixinRelations(
                self.pending_mixins.into_keys().collect(),
            ));
        }
        Ok(self.model)
    }
}

fn park(pending: &mut Pending, missing: &str, waiting: &str) {
    pending
        .entry(missing.to_owned())
        .or_default()
        .push(waiting.to_owned());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::identifiers::{ENTITY, LINK, RESOURCE};

    const INFRA: &str = "http://schemas.ogf.org/occi/infrastructure#";

    fn lines(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| (*l).to_owned()).collect()
    }

    #[test]
    fn forward_references_resolve() {
        let model = parse(&lines(&[
            r#"ipnetwork;scheme="http://schemas.ogf.org/occi/infrastructure#";class="kind";rel="http://schemas.ogf.org/occi/infrastructure#network";location="/ipnetwork/""#,
            r#"network;scheme="http://schemas.ogf.org/occi/infrastructure#";class="kind";rel="http://schemas.ogf.org/occi/core#resource";location="/network/""#,
        ]))
        .unwrap();
        let ipnetwork = model.kind(&format!("{INFRA}ipnetwork")).unwrap();
        assert_eq!(ipnetwork.parent(), Some("http://schemas.ogf.org/occi/infrastructure#network"));
        let network = model.kind(&format!("{INFRA}network")).unwrap();
        assert_eq!(network.parent(), Some(RESOURCE));
    }

    #[test]
    fn parent_does_not_depend_on_declaration_order() {
        let a = r#"a;scheme="http://example.com/occi#";class="kind";location="/a/""#;
        let b = r#"b;scheme="http://example.com/occi#";class="kind";location="/b/""#;
        let child = r#"child;scheme="http://example.com/occi#";class="kind";rel="http://example.com/occi#a http://example.com/occi#b";location="/child/""#;

        let in_order = parse(&lines(&[a, b, child])).unwrap();
        let forward = parse(&lines(&[b, child, a])).unwrap();
        assert_eq!(in_order, forward);

        for model in [&in_order, &forward] {
            let kind = model.kind("http://example.com/occi#child").unwrap();
            assert_eq!(kind.parent(), Some("http://example.com/occi#a"));
            assert_eq!(
                kind.relations().collect::<Vec<_>>(),
                ["http://example.com/occi#a", "http://example.com/occi#b"]
            );
        }
    }

    #[test]
    fn mixin_relations_keep_declaration_order() {
        let base = r#"base;scheme="http://example.com/occi#";class="mixin""#;
        let extra = r#"extra;scheme="http://example.com/occi#";class="mixin""#;
        let child = r#"child;scheme="http://example.com/occi#";class="mixin";rel="http://example.com/occi#extra http://example.com/occi#base""#;

        let model = parse(&lines(&[base, child, extra])).unwrap();
        let child = model.mixin("http://example.com/occi#child").unwrap();
        assert_eq!(
            child.relations().collect::<Vec<_>>(),
            ["http://example.com/occi#extra", "http://example.com/occi#base"]
        );
    }

    #[test]
    fn builtins_are_added_after_declarations() {
        let model = parse(&[]).unwrap();
        let ids: Vec<_> = model.kinds().identifiers().collect();
        assert_eq!(ids, [ENTITY, RESOURCE, LINK]);
    }

    #[test]
    fn declared_builtin_wins() {
        let model = parse(&lines(&[
            r#"link;scheme="http://schemas.ogf.org/occi/core#";class="kind";title="Custom Link";location="/links/""#,
        ]))
        .unwrap();
        assert_eq!(model.kinds().len(), 3);
        assert_eq!(model.kind(LINK).and_then(|k| k.location()), Some("/links/"));
        assert_eq!(model.kind(LINK).and_then(|k| k.parent()), None);
    }

    #[test]
    fn unresolved_relations_fail() {
        let err = parse(&lines(&[
            r#"a;scheme="http://example.com/occi#";class="kind";rel="http://example.com/occi#ghost";location="/a/""#,
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnresolvedKindRelations(ref ids) if ids == &["http://example.com/occi#ghost".to_owned()]
        ));

        let err = parse(&lines(&[
            r#"m;scheme="http://example.com/occi#";class="mixin";rel="http://example.com/occi#ghost""#,
        ]))
        .unwrap_err();
        assert!(matches!(err, ParseError::UnresolvedMixinRelations(_)));
    }

    #[test]
    fn mixin_relations_resolve_in_any_order() {
        let model = parse(&lines(&[
            r#"ubuntu;scheme="http://example.com/tpl#";class="mixin";rel="http://schemas.ogf.org/occi/infrastructure#os_tpl""#,
            r#"os_tpl;scheme="http://schemas.ogf.org/occi/infrastructure#";class="mixin";location="/mixin/os_tpl/""#,
        ]))
        .unwrap();
        let ubuntu = model.mixin("http://example.com/tpl#ubuntu").unwrap();
        assert_eq!(
            ubuntu.relations().collect::<Vec<_>>(),
            ["http://schemas.ogf.org/occi/infrastructure#os_tpl"]
        );
    }

    #[test]
    fn missing_location_and_duplicates_fail() {
        let err = parse(&lines(&[r#"a;scheme="http://example.com/occi#";class="kind""#])).unwrap_err();
        assert!(matches!(err, ParseError::MissingLocation(ref id) if id == "http://example.com/occi#a"));

        let line = r#"m;scheme="http://example.com/occi#";class="mixin""#;
        let err = parse(&lines(&[line, line])).unwrap_err();
        assert!(matches!(err, ParseError::DuplicateCategory(_)));
    }

    #[test]
    fn referenced_actions_become_placeholders_then_merge() {
        let model = parse(&lines(&[
            r#"compute;scheme="http://schemas.ogf.org/occi/infrastructure#";class="kind";location="/compute/";actions="http://schemas.ogf.org/occi/infrastructure/compute/action#start""#,
            r#"start;scheme="http://schemas.ogf.org/occi/infrastructure/compute/action#";class="action";title="Start""#,
            r#"start;scheme="http://schemas.ogf.org/occi/infrastructure/compute/action#";class="action";attributes="method""#,
        ]))
        .unwrap();
        assert_eq!(model.actions().len(), 1);
        let start = model
            .action("http://schemas.ogf.org/occi/infrastructure/compute/action#start")
            .unwrap();
        assert_eq!(start.title(), Some("Start"));
        assert!(start.attribute("method").is_some());
        let compute = model.kind(&format!("{INFRA}compute")).unwrap();
        assert_eq!(compute.actions().count(), 1);
    }

    #[test]
    fn invalid_lines_name_the_line() {
        let err = parse(&lines(&["garbage"])).unwrap_err();
        assert!(matches!(err, ParseError::InvalidLine(ref l) if l == "garbage"));
    }
}
