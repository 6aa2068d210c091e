//! Primitives registered from JavaScript on top of the built-in table.

use js_sys::{Function, Uint8Array};
use roulette_pow::roulette::to_digest64;
use roulette_pow::{Algorithm, Digest64, HashError, PrimitiveTable, Primitives};
use wasm_bindgen::{JsCast, JsValue};

/// Built-in primitive table plus per-algorithm JavaScript functions.
///
/// A registered function is called with the 64-byte round input as a
/// `Uint8Array` and must return a 64-byte `Uint8Array`. It replaces the
/// table's slot for that algorithm.
#[derive(Clone, Default)]
pub struct JsPrimitives {
    table: PrimitiveTable,
    functions: [Option<Function>; 16],
}

impl JsPrimitives {
    pub fn new(table: PrimitiveTable) -> Self {
        JsPrimitives {
            table,
            functions: Default::default(),
        }
    }

    pub fn register(&mut self, algorithm: Algorithm, function: Function) {
        self.functions[algorithm.index()] = Some(function);
    }

    pub fn is_available(&self, algorithm: Algorithm) -> bool {
        self.functions[algorithm.index()].is_some() || self.table.is_available(algorithm)
    }

    /// Algorithms with neither a function nor a table slot.
    pub fn missing(&self) -> Vec<Algorithm> {
        Algorithm::ALL
            .iter()
            .copied()
            .filter(|algorithm| !self.is_available(*algorithm))
            .collect()
    }
}

impl Primitives for JsPrimitives {
    fn run(&self, algorithm: Algorithm, data: &[u8]) -> Result<Digest64, HashError> {
        let function = match &self.functions[algorithm.index()] {
            Some(function) => function,
            None => return self.table.run(algorithm, data),
        };

        let output = function
            .call1(&JsValue::NULL, &Uint8Array::from(data))
            .map_err(|_| HashError::Failed(algorithm))?
            .dyn_into::<Uint8Array>()
            .map_err(|_| HashError::Failed(algorithm))?;

        to_digest64(algorithm, &output.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_builtin_table() {
        let primitives = JsPrimitives::default();
        assert_eq!(primitives.missing(), PrimitiveTable::builtin().missing());
        assert!(primitives.is_available(Algorithm::Blake512));
        assert!(!primitives.is_available(Algorithm::Fugue512));
    }

    #[test]
    fn test_unregistered_slots_use_table() {
        let primitives = JsPrimitives::new(PrimitiveTable::builtin());
        let table = PrimitiveTable::builtin();
        assert_eq!(
            primitives.run(Algorithm::Bmw512, &[7u8; 64]),
            table.run(Algorithm::Bmw512, &[7u8; 64])
        );
        assert_eq!(
            primitives.run(Algorithm::Echo512, &[7u8; 64]),
            Err(HashError::Unavailable(Algorithm::Echo512))
        );
    }
}
