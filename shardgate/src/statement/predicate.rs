//! Predicate trees flattened into `AND` groups.

use super::{Expression, Operator};

/// Flatten a predicate into groups joined by `OR`, each group a list of
/// predicates joined by `AND`.
///
/// `a = 1 AND (b = 2 OR c = 3)` becomes `[[a = 1, b = 2], [a = 1, c = 3]]`.
pub fn and_groups(expression: &Expression) -> Vec<Vec<&Expression>> {
    match expression {
        Expression::Binary {
            left,
            operator: Operator::Or,
            right,
            ..
        } => {
            let mut groups = and_groups(left);
            groups.extend(and_groups(right));
            groups
        }

        Expression::Binary {
            left,
            operator: Operator::And,
            right,
            ..
        } => {
            let left = and_groups(left);
            let right = and_groups(right);
            let mut groups = Vec::with_capacity(left.len() * right.len());
            for l in &left {
                for r in &right {
                    let mut group = l.clone();
                    group.extend(r.iter().copied());
                    groups.push(group);
                }
            }
            groups
        }

        predicate => vec![vec![predicate]],
    }
}
