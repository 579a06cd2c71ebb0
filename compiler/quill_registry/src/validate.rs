//! Build-time validation.
//!
//! Checks are grouped per symbol in first-registration order and every
//! failure is collected; a registry is assembled only when none are found.

use quill_ir::{ConstructId, Name, Type, TypeSignature};
use quill_lexer::PUNCTUATION;
use rustc_hash::FxHashMap;

use crate::internal::Internal;
use crate::{
    BuildError, BuildErrors, Configuration, Construct, ConstructDefinition, ConstructKind,
    FunctionSet, Fixity, RegisteredConstruct, Registry, TypeTable, Typing, ValueConstruct,
};

pub(crate) struct Entry {
    pub(crate) symbol: String,
    pub(crate) kind: ConstructKind,
    pub(crate) construct: Construct,
}

pub(crate) struct PrecedenceEntry {
    pub(crate) symbol: String,
    pub(crate) fixity: Fixity,
    pub(crate) precedence: i32,
}

const FIXITIES: [Fixity; 3] = [Fixity::Binary, Fixity::Prefix, Fixity::Postfix];

/// First precedence set per `(symbol, fixity)` plus every later
/// disagreeing value.
struct PrecedenceTable {
    first: FxHashMap<(String, Fixity), i32>,
    order: Vec<(String, Fixity)>,
    conflicts: Vec<(String, Fixity, i32, i32)>,
}

impl PrecedenceTable {
    fn new(entries: Vec<PrecedenceEntry>) -> Self {
        let mut table = PrecedenceTable {
            first: FxHashMap::default(),
            order: Vec::new(),
            conflicts: Vec::new(),
        };
        for entry in entries {
            let key = (entry.symbol, entry.fixity);
            match table.first.get(&key) {
                Some(&first) if first != entry.precedence => {
                    table
                        .conflicts
                        .push((key.0, key.1, first, entry.precedence));
                }
                Some(_) => {}
                None => {
                    table.order.push(key.clone());
                    table.first.insert(key, entry.precedence);
                }
            }
        }
        table
    }

    fn get(&self, symbol: &str, fixity: Fixity) -> Option<i32> {
        self.first.get(&(symbol.to_string(), fixity)).copied()
    }

    fn conflicts<'a>(
        &'a self,
        symbol: &'a str,
        fixity: Fixity,
    ) -> impl Iterator<Item = (i32, i32)> + 'a {
        self.conflicts
            .iter()
            .filter(move |(s, f, _, _)| s == symbol && *f == fixity)
            .map(|(_, _, first, second)| (*first, *second))
    }
}

/// Why `symbol` cannot be registered, if it cannot.
fn check_symbol(symbol: &str, configuration: &Configuration) -> Option<BuildError> {
    if let Some(internal) = Internal::from_symbol(symbol) {
        return Some(BuildError::ReservedSymbol {
            symbol: symbol.to_string(),
            purpose: internal.purpose(),
        });
    }
    let mut chars = symbol.chars();
    let reason = match (chars.next(), chars.next()) {
        (None, _) => Some("symbol is empty"),
        (Some(c), _) if c.is_ascii_digit() => Some("symbol starts with a digit"),
        (Some('.'), Some(c)) if c.is_alphabetic() || c == '_' => {
            Some("symbol would be read as member access")
        }
        _ if symbol.chars().any(char::is_whitespace) => Some("symbol contains whitespace"),
        _ if symbol.chars().any(char::is_control) => Some("symbol contains a control character"),
        _ if symbol.chars().any(|c| PUNCTUATION.contains(&c)) => {
            Some("symbol contains a bracket or comma")
        }
        _ if symbol.contains(configuration.lexer.string_delimiter) => {
            Some("symbol contains the string delimiter")
        }
        _ => None,
    };
    reason.map(|reason| BuildError::InvalidSymbol {
        symbol: symbol.to_string(),
        reason,
    })
}

/// A symbol may hold operator-like constructs or a single kind of
/// value-like construct, never both.
fn check_kinds(symbol: &str, group: &[Entry]) -> Option<BuildError> {
    let mut first_value: Option<ConstructKind> = None;
    let mut first_operator: Option<ConstructKind> = None;
    for entry in group {
        let kind = entry.kind;
        let earlier = if kind.fixity().is_some() {
            first_operator.get_or_insert(kind);
            first_value
        } else {
            match (first_operator, first_value) {
                (Some(op), _) => Some(op),
                (None, Some(value)) if value != kind => Some(value),
                (None, _) => {
                    first_value = Some(kind);
                    None
                }
            }
        };
        if let Some(first) = earlier {
            return Some(BuildError::IncompatibleKinds {
                symbol: symbol.to_string(),
                first,
                second: kind,
            });
        }
    }
    None
}

fn construct_id(index: usize) -> ConstructId {
    ConstructId::new(u32::try_from(index).unwrap_or(u32::MAX))
}

struct SymbolScope<'a> {
    symbol: &'a str,
    errors: &'a mut Vec<BuildError>,
}

impl SymbolScope<'_> {
    fn add_to_collection(
        &mut self,
        definition: &mut ConstructDefinition,
        converter_target: &mut Option<(Fixity, Type)>,
        id: ConstructId,
        entry: &Entry,
    ) {
        let Some(fixity) = entry.kind.fixity() else {
            return;
        };
        let symbol = self.symbol.to_string();
        let collection = definition.collection_mut(fixity);
        let key = match &entry.construct {
            Construct::Operator(op) => match &op.typing {
                Typing::Generic(_) => None,
                Typing::Fixed { params, .. } => {
                    let expected = if fixity == Fixity::Binary { 2 } else { 1 };
                    if params.len() != expected {
                        self.errors.push(BuildError::ArityMismatch {
                            symbol,
                            kind: entry.kind,
                            expected,
                            found: params.len(),
                        });
                        return;
                    }
                    Some(params.clone())
                }
            },
            Construct::Converter(converter) => {
                // Prefix and postfix converters of one symbol share a target.
                match converter_target {
                    Some((first_fixity, target)) if *target != converter.target => {
                        self.errors.push(BuildError::ConverterTargetMismatch {
                            symbol,
                            first_fixity: *first_fixity,
                            first: target.to_string(),
                            second_fixity: fixity,
                            second: converter.target.to_string(),
                        });
                        return;
                    }
                    Some(_) => {}
                    None => *converter_target = Some((fixity, converter.target.clone())),
                }
                converter.source.clone().map(TypeSignature::unary)
            }
            _ => return,
        };

        match key {
            None if collection.generic.is_some() => {
                self.errors.push(BuildError::DuplicateGeneric { symbol, fixity });
            }
            None => collection.generic = Some(id),
            Some(signature) if collection.specialized.contains_key(&signature) => {
                self.errors.push(BuildError::DuplicateSpecialized {
                    symbol,
                    fixity,
                    signature,
                });
            }
            Some(signature) => {
                collection.specialized.insert(signature, id);
            }
        }
        collection.order.push(id);
    }

    fn add_value(
        &mut self,
        definition: &mut ConstructDefinition,
        types: &mut TypeTable,
        type_owners: &mut FxHashMap<Name, String>,
        id: ConstructId,
        entry: &Entry,
    ) {
        let symbol = self.symbol.to_string();
        match &entry.construct {
            Construct::Constant(_) => {
                if definition.value.is_some() {
                    self.errors.push(BuildError::DuplicateConstant { symbol });
                } else {
                    definition.value = Some(ValueConstruct::Constant(id));
                }
            }
            Construct::TypeDeclaration(declaration) => {
                if definition.value.is_some() {
                    self.errors
                        .push(BuildError::DuplicateTypeDeclaration { symbol });
                    return;
                }
                let descriptor = &declaration.descriptor;
                for duplicate in descriptor.duplicates() {
                    self.errors.push(BuildError::DuplicateDescriptorEntry {
                        type_name: descriptor.name().to_string(),
                        entry: duplicate,
                    });
                }
                if let Some(owner) = type_owners.get(descriptor.name()) {
                    self.errors.push(BuildError::DuplicateTypeName {
                        type_name: descriptor.name().to_string(),
                        first: owner.clone(),
                        second: symbol,
                    });
                    return;
                }
                type_owners.insert(descriptor.name().clone(), symbol);
                types.insert(descriptor.clone());
                definition.value = Some(ValueConstruct::TypeDeclaration(id));
            }
            Construct::Function(function) => {
                if definition.value.is_none() {
                    definition.value = Some(ValueConstruct::Functions(FunctionSet::default()));
                }
                let Some(ValueConstruct::Functions(set)) = &mut definition.value else {
                    return;
                };
                if set.overloads.contains_key(&function.params) {
                    self.errors.push(BuildError::DuplicateOverload {
                        symbol,
                        signature: function.params.clone(),
                    });
                    return;
                }
                set.overloads.insert(function.params.clone(), id);
                set.order.push(id);
            }
            Construct::Variadic(_) => {
                if definition.value.is_some() {
                    self.errors.push(BuildError::DuplicateVariadic { symbol });
                } else {
                    definition.value = Some(ValueConstruct::Variadic(id));
                }
            }
            Construct::Operator(_) | Construct::Converter(_) => {}
        }
    }
}

/// Validates the builder's contents and assembles a registry.
pub(crate) fn assemble(
    entries: Vec<Entry>,
    precedences: Vec<PrecedenceEntry>,
    configuration: Configuration,
) -> Result<Registry, BuildErrors> {
    let mut errors: Vec<BuildError> = configuration
        .validate()
        .into_iter()
        .map(BuildError::InvalidConfiguration)
        .collect();
    let precedences = PrecedenceTable::new(precedences);

    let mut groups: Vec<(String, Vec<Entry>)> = Vec::new();
    let mut group_of: FxHashMap<String, usize> = FxHashMap::default();
    for entry in entries {
        if let Some(&i) = group_of.get(&entry.symbol) {
            groups[i].1.push(entry);
        } else {
            group_of.insert(entry.symbol.clone(), groups.len());
            groups.push((entry.symbol.clone(), vec![entry]));
        }
    }

    let mut constructs: Vec<RegisteredConstruct> = Vec::new();
    let mut definitions: FxHashMap<Name, ConstructDefinition> = FxHashMap::default();
    let mut types = TypeTable::new();
    let mut type_owners: FxHashMap<Name, String> = FxHashMap::default();

    for (symbol, group) in groups {
        if let Some(error) = check_symbol(&symbol, &configuration) {
            errors.push(error);
            continue;
        }
        if let Some(error) = check_kinds(&symbol, &group) {
            errors.push(error);
            continue;
        }

        let name = Name::new(&symbol);
        let mut definition = ConstructDefinition::new(name.clone());
        let mut converter_target = None;
        let mut scope = SymbolScope {
            symbol: &symbol,
            errors: &mut errors,
        };
        for entry in group {
            let id = construct_id(constructs.len());
            definition.kinds |= entry.kind.flag();
            if entry.kind.fixity().is_some() {
                scope.add_to_collection(&mut definition, &mut converter_target, id, &entry);
            } else {
                scope.add_value(&mut definition, &mut types, &mut type_owners, id, &entry);
            }
            constructs.push(RegisteredConstruct {
                symbol: name.clone(),
                kind: entry.kind,
                construct: entry.construct,
            });
        }

        for fixity in FIXITIES {
            let present = definition.collection(fixity).is_some();
            match (present, precedences.get(&symbol, fixity)) {
                (true, Some(precedence)) => definition.collection_mut(fixity).precedence = precedence,
                (true, None) => errors.push(BuildError::MissingPrecedence {
                    symbol: symbol.clone(),
                    fixity,
                }),
                (false, Some(_)) => errors.push(BuildError::OrphanPrecedence {
                    symbol: symbol.clone(),
                    fixity,
                }),
                (false, None) => {}
            }
            for (first, second) in precedences.conflicts(&symbol, fixity) {
                errors.push(BuildError::ConflictingPrecedence {
                    symbol: symbol.clone(),
                    fixity,
                    first,
                    second,
                });
            }
        }
        definitions.insert(name, definition);
    }

    for (symbol, fixity) in &precedences.order {
        if !group_of.contains_key(symbol) {
            errors.push(BuildError::OrphanPrecedence {
                symbol: symbol.clone(),
                fixity: *fixity,
            });
        }
    }

    if !errors.is_empty() {
        return Err(BuildErrors::new(errors));
    }
    Ok(Registry::from_parts(
        constructs,
        definitions,
        types,
        configuration,
    ))
}

#[cfg(test)]
mod tests;
