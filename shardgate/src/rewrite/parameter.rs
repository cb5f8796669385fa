//! Parameters of rewritten statements.
//!
//! Generators replace parameters (encrypted values, pagination bounds) and
//! add new ones (assisted query values, generated keys). The builder is
//! threaded through every generator and produces the final list per unit.

use std::collections::{BTreeMap, HashMap};

use crate::statement::{Expression, InsertStatement, Value};

/// Parameters of any statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandardParameterBuilder {
    original: Vec<Value>,
    replaced: HashMap<usize, Value>,
    added: BTreeMap<usize, Vec<Value>>,
}

impl StandardParameterBuilder {
    pub fn new(original: &[Value]) -> Self {
        Self {
            original: original.to_vec(),
            ..Default::default()
        }
    }

    fn value(&self, index: usize) -> Option<&Value> {
        self.replaced.get(&index).or_else(|| self.original.get(index))
    }

    /// Parameter at `index` and the ones added after it.
    fn expand(&self, index: usize, parameters: &mut Vec<Value>) {
        if let Some(value) = self.value(index) {
            parameters.push(value.clone());
        }
        if let Some(added) = self.added.get(&index) {
            parameters.extend(added.iter().cloned());
        }
    }

    pub fn parameters(&self) -> Vec<Value> {
        let mut parameters = Vec::with_capacity(self.original.len());
        for index in 0..self.original.len() {
            self.expand(index, &mut parameters);
        }
        parameters
    }
}

/// One `VALUES` row of an `INSERT`.
#[derive(Debug, Clone, Default, PartialEq)]
struct ParameterGroup {
    indexes: Vec<usize>,
    added: Vec<Value>,
}

/// Parameters of a multi-row `INSERT`, grouped by row so each unit gets
/// only the rows routed to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedParameterBuilder {
    standard: StandardParameterBuilder,
    groups: Vec<ParameterGroup>,
    /// Parameters outside `VALUES`.
    generic: Vec<usize>,
}

impl GroupedParameterBuilder {
    pub fn new(insert: &InsertStatement, original: &[Value]) -> Self {
        let mut grouped = vec![false; original.len()];
        let mut groups = vec![];

        for row in &insert.values {
            let mut group = ParameterGroup::default();
            for value in &row.values {
                value.walk(&mut |expr| {
                    if let Expression::Parameter { index, .. } = expr {
                        group.indexes.push(*index);
                        if let Some(seen) = grouped.get_mut(*index) {
                            *seen = true;
                        }
                    }
                });
            }
            groups.push(group);
        }

        let generic = grouped
            .iter()
            .enumerate()
            .filter(|(_, grouped)| !**grouped)
            .map(|(index, _)| index)
            .collect();

        Self {
            standard: StandardParameterBuilder::new(original),
            groups,
            generic,
        }
    }

    pub fn groups(&self) -> usize {
        self.groups.len()
    }

    /// Parameters of the given rows, or of every row.
    pub fn parameters(&self, rows: Option<&[usize]>) -> Vec<Value> {
        let selected: Vec<usize> = match rows {
            Some(rows) => rows.to_vec(),
            None => (0..self.groups.len()).collect(),
        };

        let mut parameters = vec![];
        for row in selected {
            let Some(group) = self.groups.get(row) else {
                continue;
            };
            for index in &group.indexes {
                self.standard.expand(*index, &mut parameters);
            }
            parameters.extend(group.added.iter().cloned());
        }
        for index in &self.generic {
            self.standard.expand(*index, &mut parameters);
        }
        parameters
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParameterBuilder {
    Standard(StandardParameterBuilder),
    Grouped(GroupedParameterBuilder),
}

impl ParameterBuilder {
    fn standard_mut(&mut self) -> &mut StandardParameterBuilder {
        match self {
            Self::Standard(standard) => standard,
            Self::Grouped(grouped) => &mut grouped.standard,
        }
    }

    /// Replace the parameter at `index`.
    pub fn replace(&mut self, index: usize, value: Value) {
        self.standard_mut().replaced.insert(index, value);
    }

    /// Add a parameter right after the one at `index`.
    pub fn add_after(&mut self, index: usize, value: Value) {
        self.standard_mut()
            .added
            .entry(index)
            .or_default()
            .push(value);
    }

    /// Add a parameter at the end of a row. Ignored by standard builders.
    pub fn add_to_row(&mut self, row: usize, value: Value) {
        if let Self::Grouped(grouped) = self {
            if let Some(group) = grouped.groups.get_mut(row) {
                group.added.push(value);
            }
        }
    }

    /// Parameters for a unit. `rows` selects `INSERT` rows.
    pub fn parameters(&self, rows: Option<&[usize]>) -> Vec<Value> {
        match self {
            Self::Standard(standard) => standard.parameters(),
            Self::Grouped(grouped) => grouped.parameters(rows),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Standard(standard) => standard.original.is_empty(),
            Self::Grouped(grouped) => grouped.standard.original.is_empty(),
        }
    }
}
