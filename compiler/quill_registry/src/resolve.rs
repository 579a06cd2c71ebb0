//! Overload resolution.
//!
//! A collection applied to operand types `T1..Tn` tries, in order:
//!
//! 1. the specialized construct keyed by exactly `(T1..Tn)`,
//! 2. the generic construct, if its rule accepts the operands,
//! 3. specialized constructs reachable by widening some `int` operands to
//!    `float`, fewest widenings first and leftmost first.
//!
//! Function sets skip step 2. Widened operands are reported in
//! [`Resolution::widen`] so the parser can insert explicit conversions.

use std::sync::Arc;

use quill_ir::{widen_int, ConstructId, Evaluator, Type, TypeSignature, Value};
use smallvec::{smallvec, SmallVec};
use tracing::trace;

use crate::{
    CallRejection, CallSite, Construct, ConstructCollection, FunctionSet, Registry, Typing,
};

/// Per-operand flags: `true` where an `int` operand must be widened.
pub type Widening = SmallVec<[bool; 4]>;

/// Past this many `int` operands only the all-widened candidate is tried.
const MAX_WIDENING_POSITIONS: usize = 8;

/// A successful resolution.
#[derive(Clone)]
pub struct Resolution {
    pub construct: ConstructId,
    pub result: Type,
    pub eval: Evaluator,
    pub widen: Widening,
}

impl Resolution {
    pub fn is_widened(&self) -> bool {
        self.widen.iter().any(|w| *w)
    }
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolution")
            .field("construct", &self.construct)
            .field("result", &self.result)
            .field("widen", &self.widen)
            .finish_non_exhaustive()
    }
}

/// Why no construct applies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveError {
    /// No overload accepts the operand types.
    NoOverload {
        available: Vec<String>,
        /// The generic construct's explanation, when it declined.
        rejection: Option<String>,
    },
    /// No overload takes this many arguments.
    WrongArity { expected: Vec<usize>, found: usize },
    /// A variadic resolver declined the call.
    Rejected(CallRejection),
}

/// Candidate widenings of `operands`, in trial order.
pub(crate) fn widening_candidates(operands: &[Type]) -> Vec<Widening> {
    let positions: Vec<usize> = operands
        .iter()
        .enumerate()
        .filter(|(_, ty)| **ty == Type::Int)
        .map(|(i, _)| i)
        .collect();
    let len = operands.len();
    let k = positions.len();
    if k == 0 {
        return Vec::new();
    }
    if k > MAX_WIDENING_POSITIONS {
        let mut all: Widening = smallvec![false; len];
        for &p in &positions {
            all[p] = true;
        }
        return vec![all];
    }

    let mut candidates = Vec::with_capacity((1 << k) - 1);
    for size in 1..=k {
        let mut idx: Vec<usize> = (0..size).collect();
        loop {
            let mut widen: Widening = smallvec![false; len];
            for &i in &idx {
                widen[positions[i]] = true;
            }
            candidates.push(widen);

            let mut i = size;
            while i > 0 && idx[i - 1] == i - 1 + k - size {
                i -= 1;
            }
            if i == 0 {
                break;
            }
            idx[i - 1] += 1;
            for j in i..size {
                idx[j] = idx[j - 1] + 1;
            }
        }
    }
    candidates
}

fn apply_widening(operands: &[Type], widen: &[bool]) -> TypeSignature {
    TypeSignature::new(
        operands
            .iter()
            .zip(widen)
            .map(|(ty, w)| if *w { Type::Float } else { ty.clone() }),
    )
}

/// Picks among fixed signatures: exact first, then by widening.
///
/// Returns the index of the chosen signature and the widening it needs.
pub fn select_signature<'a, I>(signatures: I, operands: &[Type]) -> Option<(usize, Widening)>
where
    I: IntoIterator<Item = &'a TypeSignature>,
{
    let signatures: Vec<&TypeSignature> = signatures.into_iter().collect();
    if let Some(i) = signatures.iter().position(|s| s.types() == operands) {
        return Some((i, smallvec![false; operands.len()]));
    }
    for widen in widening_candidates(operands) {
        let widened = apply_widening(operands, &widen);
        if let Some(i) = signatures.iter().position(|s| **s == widened) {
            return Some((i, widen));
        }
    }
    None
}

/// Wraps `eval` so that the flagged arguments, starting at `offset`, are
/// widened from `int` to `float` before the call.
pub fn widening_evaluator(eval: Evaluator, widen: &[bool], offset: usize) -> Evaluator {
    if !widen.iter().any(|w| *w) {
        return eval;
    }
    let widen: Widening = widen.iter().copied().collect();
    Arc::new(move |args: &[Value]| {
        let converted: SmallVec<[Value; 4]> = args
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let flagged = i >= offset && widen.get(i - offset).copied().unwrap_or(false);
                match value {
                    Value::Int(n) if flagged => Value::Float(widen_int(*n)),
                    other => other.clone(),
                }
            })
            .collect();
        eval(&converted)
    })
}

impl Registry {
    /// Resolves an operator or converter collection against operand types.
    pub fn resolve_operator(
        &self,
        collection: &ConstructCollection,
        operands: &[Type],
    ) -> Result<Resolution, ResolveError> {
        let key = TypeSignature::from(operands);
        if let Some(id) = collection.specialized(&key) {
            trace!(construct = id.raw(), signature = %key, "exact overload");
            return self.fixed(id, smallvec![false; operands.len()]);
        }

        let mut rejection = None;
        if let Some(id) = collection.generic() {
            let construct = self.construct(id);
            let outcome = match &construct.construct {
                Construct::Operator(op) => match &op.typing {
                    Typing::Generic(rule) => rule(operands).map(|result| (result, op.eval.clone())),
                    Typing::Fixed { .. } => Err("not a generic operator".to_string()),
                },
                Construct::Converter(c) => Ok((c.target.clone(), c.eval.clone())),
                _ => Err(format!("`{}` cannot be applied", construct.symbol)),
            };
            match outcome {
                Ok((result, eval)) => {
                    trace!(construct = id.raw(), result = %result, "generic overload");
                    return Ok(Resolution {
                        construct: id,
                        result,
                        eval,
                        widen: smallvec![false; operands.len()],
                    });
                }
                Err(message) => rejection = Some(message),
            }
        }

        for widen in widening_candidates(operands) {
            let widened = apply_widening(operands, &widen);
            if let Some(id) = collection.specialized(&widened) {
                trace!(construct = id.raw(), signature = %widened, "widened overload");
                return self.fixed(id, widen);
            }
        }

        Err(ResolveError::NoOverload {
            available: self.available(collection.constructs()),
            rejection,
        })
    }

    /// Resolves a call to a fixed-arity function set.
    pub fn resolve_functions(
        &self,
        set: &FunctionSet,
        args: &[Type],
    ) -> Result<Resolution, ResolveError> {
        let key = TypeSignature::from(args);
        if let Some(id) = set.get(&key) {
            return self.fixed(id, smallvec![false; args.len()]);
        }
        for widen in widening_candidates(args) {
            if let Some(id) = set.get(&apply_widening(args, &widen)) {
                return self.fixed(id, widen);
            }
        }
        let arities = set.arities();
        if !arities.contains(&args.len()) {
            return Err(ResolveError::WrongArity {
                expected: arities,
                found: args.len(),
            });
        }
        Err(ResolveError::NoOverload {
            available: self.available(set.constructs()),
            rejection: None,
        })
    }

    /// Resolves a call to a variadic function.
    pub fn resolve_variadic(
        &self,
        id: ConstructId,
        site: &CallSite<'_>,
    ) -> Result<Resolution, ResolveError> {
        let construct = self.construct(id);
        let Construct::Variadic(variadic) = &construct.construct else {
            return Err(ResolveError::Rejected(CallRejection::Types(format!(
                "`{}` is not a variadic function",
                construct.symbol
            ))));
        };
        let resolved = (variadic.resolver)(site).map_err(ResolveError::Rejected)?;
        trace!(construct = id.raw(), args = site.len(), result = %resolved.result, "variadic call");
        Ok(Resolution {
            construct: id,
            result: resolved.result,
            eval: resolved.eval,
            widen: smallvec![false; site.len()],
        })
    }

    /// Finds a converter from `from` to `to`: exact source first, then any
    /// generic converter targeting `to`. Registration order breaks ties.
    pub fn find_converter(&self, from: &Type, to: &Type) -> Option<Resolution> {
        let converters = || {
            self.constructs().iter().enumerate().filter_map(|(i, c)| match &c.construct {
                Construct::Converter(conv) if conv.target == *to => Some((i, conv)),
                _ => None,
            })
        };
        let (index, converter) = converters()
            .find(|(_, c)| c.source.as_ref() == Some(from))
            .or_else(|| converters().find(|(_, c)| c.source.is_none()))?;
        let construct = ConstructId::new(u32::try_from(index).ok()?);
        trace!(construct = construct.raw(), from = %from, to = %to, "output converter");
        Some(Resolution {
            construct,
            result: converter.target.clone(),
            eval: converter.eval.clone(),
            widen: smallvec![false],
        })
    }

    fn fixed(&self, id: ConstructId, widen: Widening) -> Result<Resolution, ResolveError> {
        let construct = self.construct(id);
        match (construct.fixed_result(), construct.evaluator()) {
            (Some(result), Some(eval)) => Ok(Resolution {
                construct: id,
                result,
                eval: eval.clone(),
                widen,
            }),
            _ => Err(ResolveError::Rejected(CallRejection::Types(format!(
                "`{}` cannot be applied",
                construct.symbol
            )))),
        }
    }

    fn available(&self, ids: &[ConstructId]) -> Vec<String> {
        ids.iter()
            .filter_map(|&id| self.construct(id).signature())
            .map(|sig| sig.to_string())
            .collect()
    }
}
