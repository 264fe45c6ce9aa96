//! Rule visitor
//!
//! Walks a parsed stylesheet depth-first: `visit_*` is called on a node,
//! then its children are walked, then `leave_*` is called. At-rules visit
//! their nested rules before their declarations.

use crate::parser::{AtRule, Declaration, QualifiedRule, Rule, Stylesheet};

/// Callbacks for each node kind; all default to doing nothing
pub trait RuleVisitor<'a> {
    fn visit_stylesheet(&mut self, _stylesheet: &'a Stylesheet) {}
    fn leave_stylesheet(&mut self, _stylesheet: &'a Stylesheet) {}
    fn visit_at_rule(&mut self, _at_rule: &'a AtRule) {}
    fn leave_at_rule(&mut self, _at_rule: &'a AtRule) {}
    fn visit_qualified_rule(&mut self, _rule: &'a QualifiedRule) {}
    fn leave_qualified_rule(&mut self, _rule: &'a QualifiedRule) {}
    fn visit_declaration(&mut self, _declaration: &'a Declaration) {}
    fn leave_declaration(&mut self, _declaration: &'a Declaration) {}
}

impl Stylesheet {
    pub fn accept<'a>(&'a self, visitor: &mut dyn RuleVisitor<'a>) {
        visitor.visit_stylesheet(self);
        for rule in &self.rules {
            rule.accept(visitor);
        }
        visitor.leave_stylesheet(self);
    }
}

impl Rule {
    pub fn accept<'a>(&'a self, visitor: &mut dyn RuleVisitor<'a>) {
        match self {
            Rule::Qualified(rule) => rule.accept(visitor),
            Rule::At(rule) => rule.accept(visitor),
        }
    }
}

impl AtRule {
    pub fn accept<'a>(&'a self, visitor: &mut dyn RuleVisitor<'a>) {
        visitor.visit_at_rule(self);
        for rule in &self.rules {
            rule.accept(visitor);
        }
        for declaration in &self.declarations {
            declaration.accept(visitor);
        }
        visitor.leave_at_rule(self);
    }
}

impl QualifiedRule {
    pub fn accept<'a>(&'a self, visitor: &mut dyn RuleVisitor<'a>) {
        visitor.visit_qualified_rule(self);
        for declaration in &self.declarations {
            declaration.accept(visitor);
        }
        visitor.leave_qualified_rule(self);
    }
}

impl Declaration {
    pub fn accept<'a>(&'a self, visitor: &mut dyn RuleVisitor<'a>) {
        visitor.visit_declaration(self);
        visitor.leave_declaration(self);
    }
}
