//! `!important` declarations

use crate::parser::{Declaration, Stylesheet};
use crate::visitor::RuleVisitor;

/// Collect every declaration marked `!important`, in document order
pub fn extract_important_declarations<'a>(
    stylesheet: &'a Stylesheet,
    important: &mut Vec<&'a Declaration>,
) {
    struct ImportantPropertyVisitor<'a, 'v> {
        important: &'v mut Vec<&'a Declaration>,
    }

    impl<'a> RuleVisitor<'a> for ImportantPropertyVisitor<'a, '_> {
        fn visit_declaration(&mut self, declaration: &'a Declaration) {
            if declaration.important {
                self.important.push(declaration);
            }
        }
    }

    stylesheet.accept(&mut ImportantPropertyVisitor { important });
}
