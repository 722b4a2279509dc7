//! Restriction checker
//!
//! Walks an expanded pattern graph and enforces the context restrictions a
//! schema must satisfy before it can be used for validation: what may occur
//! in the start pattern, inside lists, attributes and data exceptions, how
//! attributes may repeat, and which interleaves are ambiguous.

use crate::alphabet::Alphabet;
use crate::config::CheckConfig;
use crate::context::Context;
use crate::duplicate::DuplicateAttributeDetector;
use crate::violation::{RestrictionViolation, Rule};
use crate::Result;
use rng_pattern::{ContentType, ElementPattern, NameClass, PatternArena, PatternId, PatternKind};
use tracing::{debug, trace};

/// Checks an expanded pattern graph against the schema restrictions
///
/// Elements whose content passes are flagged in the arena, so shared and
/// recursive content is only checked once.
pub struct RestrictionChecker<'a> {
    arena: &'a mut PatternArena,
    config: CheckConfig,
}

impl<'a> RestrictionChecker<'a> {
    /// Create a checker with the default configuration
    pub fn new(arena: &'a mut PatternArena) -> Self {
        Self::with_config(arena, CheckConfig::default())
    }

    /// Create a checker with a specific configuration
    pub fn with_config(arena: &'a mut PatternArena, config: CheckConfig) -> Self {
        Self { arena, config }
    }

    /// Check `start` as the start pattern of a schema.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Violation`] for the first restriction broken.
    pub fn check_start(&mut self, start: PatternId) -> Result<()> {
        let mut dad = DuplicateAttributeDetector::new();
        self.check(start, Context::Start, Some(&mut dad), None)
            .inspect_err(|e| debug!("Restriction check of start pattern {} failed: {}", start, e))
    }

    /// Check `pattern` in `context`.
    ///
    /// `dad` collects attribute names when attributes are being tracked and
    /// `alpha` collects element names when an enclosing interleave needs them.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Violation`] for the first restriction broken.
    pub fn check(
        &mut self,
        pattern: PatternId,
        context: Context,
        mut dad: Option<&mut DuplicateAttributeDetector>,
        mut alpha: Option<&mut Alphabet>,
    ) -> Result<()> {
        match self.arena.kind(pattern).clone() {
            PatternKind::NotAllowed | PatternKind::UnexpandedNotAllowed | PatternKind::Error => {
                Ok(())
            }
            PatternKind::Empty => match context {
                Context::Start => violation(Rule::StartContainsEmpty),
                Context::DataExcept => violation(Rule::DataExceptContainsEmpty),
                _ => Ok(()),
            },
            PatternKind::Text => match context {
                Context::Start => violation(Rule::StartContainsText),
                Context::DataExcept => violation(Rule::DataExceptContainsText),
                Context::List => violation(Rule::ListContainsText),
                _ => Ok(()),
            },
            PatternKind::Data { .. } => check_data(context),
            PatternKind::Value { .. } => match context {
                Context::Start => violation(Rule::StartContainsValue),
                _ => Ok(()),
            },
            PatternKind::DataExcept {
                except, location, ..
            } => {
                check_data(context)?;
                self.check(except, Context::DataExcept, None, None)
                    .map_err(|e| e.with_location(location.as_ref()))
            }
            PatternKind::List { content, location } => {
                match context {
                    Context::Start => violation(Rule::StartContainsList),
                    Context::DataExcept => violation(Rule::DataExceptContainsList),
                    Context::List => violation(Rule::ListContainsList),
                    _ => Ok(()),
                }
                .map_err(|e| e.with_location(location.as_ref()))?;
                self.check(content, Context::List, None, None)
                    .map_err(|e| e.with_location(location.as_ref()))
            }
            PatternKind::Attribute {
                name_class,
                content,
                location,
            } => self
                .check_attribute(&name_class, content, context, dad)
                .map_err(|e| e.with_location(location.as_ref())),
            PatternKind::Element(element) => self.check_element(pattern, &element, context, alpha),
            PatternKind::Choice(..) => {
                // The whole run of alternatives is one choice for the detector.
                let (alternatives, _) = self.run(pattern);
                if let Some(d) = dad.as_deref_mut() {
                    d.start_choice();
                }
                for (i, alternative) in alternatives.into_iter().enumerate() {
                    if i > 0 {
                        if let Some(d) = dad.as_deref_mut() {
                            d.alternative();
                        }
                    }
                    self.check(alternative, context, dad.as_deref_mut(), alpha.as_deref_mut())?;
                }
                if let Some(d) = dad {
                    d.end_choice();
                }
                Ok(())
            }
            PatternKind::Group(..) => {
                match context {
                    Context::Start => violation(Rule::StartContainsGroup)?,
                    Context::DataExcept => violation(Rule::DataExceptContainsGroup)?,
                    _ => {}
                }
                let inner = context.for_group();
                let (members, pairs) = self.run(pattern);
                for member in members {
                    self.check(member, inner, dad.as_deref_mut(), alpha.as_deref_mut())?;
                }
                if context != Context::List && pairs.iter().any(|&(a, b)| !self.groupable(a, b)) {
                    return violation(Rule::GroupString);
                }
                Ok(())
            }
            PatternKind::Interleave(..) => self.check_interleave(pattern, context, dad, alpha),
            PatternKind::OneOrMore(content) => {
                let strict = self.config.is_strict();
                match context {
                    Context::Start => violation(Rule::StartContainsOneOrMore)?,
                    Context::DataExcept => violation(Rule::DataExceptContainsOneOrMore)?,
                    Context::ElementRepeatGroup if strict => {
                        violation(Rule::OneOrMoreContainsGroupContainsOneOrMore)?;
                    }
                    Context::ElementRepeatInterleave if strict => {
                        violation(Rule::OneOrMoreContainsInterleaveContainsOneOrMore)?;
                    }
                    _ => {}
                }
                let inner = context.for_repeat();
                if strict && dad.is_some() {
                    let mut fresh = DuplicateAttributeDetector::new();
                    self.check(content, inner, Some(&mut fresh), alpha)
                } else {
                    self.check(content, inner, dad, alpha)
                }
            }
        }
    }

    fn check_attribute(
        &mut self,
        name_class: &NameClass,
        content: PatternId,
        context: Context,
        dad: Option<&mut DuplicateAttributeDetector>,
    ) -> Result<()> {
        match context {
            Context::Start => violation(Rule::StartContainsAttribute)?,
            Context::Element if name_class.is_open() => {
                violation(Rule::OpenNameClassNotRepeated)?;
            }
            Context::ElementRepeatGroup => {
                violation(Rule::OneOrMoreContainsGroupContainsAttribute)?;
            }
            Context::ElementRepeatInterleave => {
                violation(Rule::OneOrMoreContainsInterleaveContainsAttribute)?;
            }
            Context::List => violation(Rule::ListContainsAttribute)?,
            Context::Attribute => violation(Rule::AttributeContainsAttribute)?,
            Context::DataExcept => violation(Rule::DataExceptContainsAttribute)?,
            _ => {}
        }
        if let Some(dad) = dad {
            if !dad.add_attribute(name_class) {
                let v = match name_class.simple_name() {
                    Some(name) => RestrictionViolation::named(Rule::DuplicateAttribute, name.to_string()),
                    None => RestrictionViolation::new(Rule::DuplicateAttribute),
                };
                return Err(v.into());
            }
        }
        self.check(content, Context::Attribute, None, None)
    }

    fn check_element(
        &mut self,
        id: PatternId,
        element: &ElementPattern,
        context: Context,
        alpha: Option<&mut Alphabet>,
    ) -> Result<()> {
        match context {
            Context::DataExcept => violation(Rule::DataExceptContainsElement),
            Context::List => violation(Rule::ListContainsElement),
            Context::Attribute => violation(Rule::AttributeContainsElement),
            _ => Ok(()),
        }
        .map_err(|e| e.with_location(element.location()))?;

        if let Some(alpha) = alpha {
            alpha.add_element(element.orig_name_class());
        }
        if element.restrictions_checked() {
            return Ok(());
        }

        trace!("Checking content of element {} ({})", id, element.orig_name_class());
        self.arena.set_restrictions_checked(id, true)?;
        let mut dad = DuplicateAttributeDetector::new();
        if let Err(e) = self.check(element.content(), Context::Element, Some(&mut dad), None) {
            self.arena.set_restrictions_checked(id, false)?;
            return Err(e.with_location(element.location()));
        }
        Ok(())
    }

    fn check_interleave(
        &mut self,
        pattern: PatternId,
        context: Context,
        mut dad: Option<&mut DuplicateAttributeDetector>,
        alpha: Option<&mut Alphabet>,
    ) -> Result<()> {
        match context {
            Context::Start => violation(Rule::StartContainsInterleave)?,
            Context::DataExcept => violation(Rule::DataExceptContainsInterleave)?,
            Context::List => violation(Rule::ListContainsInterleave)?,
            _ => {}
        }
        let inner = context.for_interleave();
        let (members, pairs) = self.run(pattern);

        // Each member must be disjoint from every member before it.
        let mut seen = Alphabet::new();
        for member in members {
            let mut own = Alphabet::new();
            self.check(member, inner, dad.as_deref_mut(), Some(&mut own))?;
            seen.check_overlap(&own)?;
            seen.add_alphabet(&own);
        }
        if let Some(alpha) = alpha {
            alpha.add_alphabet(&seen);
        }

        for (a, b) in pairs {
            if !self.groupable(a, b) {
                return violation(Rule::InterleaveString);
            }
            if self.arena.content_type(a) == ContentType::Mixed
                && self.arena.content_type(b) == ContentType::Mixed
            {
                return violation(Rule::InterleaveTextOverlap);
            }
        }
        Ok(())
    }

    /// Operands of the same-kind run at `pattern`, plus the operand pair of
    /// every binary node in it.
    fn run(&self, pattern: PatternId) -> (Vec<PatternId>, Vec<(PatternId, PatternId)>) {
        let mut members = Vec::new();
        let mut pairs = Vec::new();
        self.arena.walk_run(pattern, |a, b| pairs.push((a, b)), &mut members);
        (members, pairs)
    }

    fn groupable(&self, a: PatternId, b: PatternId) -> bool {
        ContentType::groupable(self.arena.content_type(a), self.arena.content_type(b))
    }
}

fn check_data(context: Context) -> Result<()> {
    match context {
        Context::Start => violation(Rule::StartContainsData),
        _ => Ok(()),
    }
}

fn violation(rule: Rule) -> Result<()> {
    Err(RestrictionViolation::new(rule).into())
}
