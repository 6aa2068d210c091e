//! Proof-of-work checker exposed to JavaScript.

use roulette_pow::block::BLOCK_HEADER_SIZE;
use roulette_pow::{
    check_proof_of_work, get_next_work_required, Algorithm, BlockHeader, ConsensusParams,
    Hash256, HeaderChain, HeaderMeta, Network, PowError, PrimitiveTable, RouletteHasher,
};
use wasm_bindgen::prelude::*;

use crate::primitives::JsPrimitives;
use crate::state::{PowCheckInfo, TargetInfo};

/// Checks hashes, headers and difficulty for one parameter set.
#[wasm_bindgen]
pub struct PowChecker {
    /// Network name, or "custom" for parameters loaded from JSON.
    network: String,
    /// Consensus parameters in force.
    params: ConsensusParams,
    /// Built-in primitives plus any registered from JS.
    primitives: JsPrimitives,
}

#[wasm_bindgen]
impl PowChecker {
    /// Create a checker for a preset network.
    ///
    /// # Arguments
    /// * `network` - "mainnet", "testnet" or "regtest"
    #[wasm_bindgen(constructor)]
    pub fn new(network: &str) -> Result<PowChecker, JsValue> {
        let net = Network::from_str(network)
            .ok_or_else(|| JsValue::from_str("Invalid network"))?;

        Ok(PowChecker {
            network: net.name().to_string(),
            params: net.params(),
            primitives: JsPrimitives::default(),
        })
    }

    /// Create a checker from consensus parameters given as JSON.
    #[wasm_bindgen]
    pub fn from_params_json(json: &str) -> Result<PowChecker, JsValue> {
        let params = ConsensusParams::from_json(json)
            .map_err(|e| JsValue::from_str(&format!("Invalid parameters: {}", e)))?;

        Ok(PowChecker {
            network: "custom".to_string(),
            params,
            primitives: JsPrimitives::default(),
        })
    }

    /// RouletteHash of `data`, in display format.
    #[wasm_bindgen]
    pub fn roulette_hash(&self, data: &[u8]) -> Result<String, JsValue> {
        self.hasher()
            .hash(data)
            .map(|hash| hash.to_display_hex())
            .map_err(|e| JsValue::from_str(&format!("{}", e)))
    }

    /// Check a display-format hash against `bits`.
    #[wasm_bindgen]
    pub fn check_hash(&self, hash: &str, bits: u32) -> Result<JsValue, JsValue> {
        let hash = Hash256::from_display_hex(hash)
            .map_err(|e| JsValue::from_str(&format!("Invalid hash hex: {}", e)))?;

        self.check_hash_info(&hash, bits).to_js()
    }

    /// Hash an 80-byte serialized header and check it against its own bits.
    #[wasm_bindgen]
    pub fn check_header(&self, header: &[u8]) -> Result<JsValue, JsValue> {
        self.check_header_info(header)?.to_js()
    }

    /// Compact bits required for the block after the last of `headers`.
    ///
    /// # Arguments
    /// * `headers` - Array of `{ time, bits }` from genesis to the tip
    /// * `candidate_time` - Timestamp of the block being built, a whole
    ///   number of seconds that fits the header's 32-bit field
    #[wasm_bindgen]
    pub fn next_work_required(&self, headers: JsValue, candidate_time: f64) -> Result<u32, JsValue> {
        let candidate_time = header_time(candidate_time)?;
        let headers: Vec<HeaderMeta> = serde_wasm_bindgen::from_value(headers)
            .map_err(|e| JsValue::from_str(&format!("Invalid headers: {}", e)))?;

        self.next_work_for(HeaderChain::from_headers(headers), candidate_time)
    }

    /// Decode `bits` for display.
    #[wasm_bindgen]
    pub fn target_info(&self, bits: u32) -> Result<JsValue, JsValue> {
        TargetInfo::new(bits).to_js()
    }

    /// Compact form of the network's easiest target.
    #[wasm_bindgen(getter)]
    pub fn pow_limit_bits(&self) -> u32 {
        self.params.pow_limit_bits()
    }

    /// Supply the implementation of one primitive.
    ///
    /// # Arguments
    /// * `name` - Algorithm name, e.g. "fugue512"
    /// * `function` - Maps a 64-byte `Uint8Array` to a 64-byte `Uint8Array`
    #[wasm_bindgen]
    pub fn register_primitive(&mut self, name: &str, function: js_sys::Function) -> Result<(), JsValue> {
        let algorithm = Algorithm::from_name(name)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown algorithm: {}", name)))?;
        self.primitives.register(algorithm, function);
        Ok(())
    }

    /// Names of the primitives that still have no implementation.
    #[wasm_bindgen]
    pub fn missing_primitives(&self) -> Vec<String> {
        self.primitives
            .missing()
            .iter()
            .map(|algorithm| algorithm.name().to_string())
            .collect()
    }

    /// Get the current network.
    #[wasm_bindgen(getter)]
    pub fn network(&self) -> String {
        self.network.clone()
    }
}

impl PowChecker {
    /// Checker for a preset network over a primitive table chosen in Rust.
    pub fn with_table(network: Network, table: PrimitiveTable) -> PowChecker {
        PowChecker {
            network: network.name().to_string(),
            params: network.params(),
            primitives: JsPrimitives::new(table),
        }
    }

    fn hasher(&self) -> RouletteHasher<&JsPrimitives> {
        RouletteHasher::new(&self.primitives)
    }

    fn check_hash_info(&self, hash: &Hash256, bits: u32) -> PowCheckInfo {
        let result = check_proof_of_work(hash, bits, &self.params);
        PowCheckInfo::new(Some(hash), bits, result)
    }

    fn check_header_info(&self, header: &[u8]) -> Result<PowCheckInfo, JsValue> {
        let bytes: &[u8; BLOCK_HEADER_SIZE] = header
            .try_into()
            .map_err(|_| JsValue::from_str("Header must be 80 bytes"))?;
        let header = BlockHeader::deserialize(bytes);

        match header.pow_hash(&self.hasher()) {
            Ok(hash) => Ok(self.check_hash_info(&hash, header.bits)),
            Err(e) => Ok(PowCheckInfo::new(None, header.bits, Err(PowError::Hash(e)))),
        }
    }

    fn next_work_for(&self, chain: HeaderChain, candidate_time: u32) -> Result<u32, JsValue> {
        let tip = chain
            .tip()
            .ok_or_else(|| JsValue::from_str("No headers given"))?;

        get_next_work_required(&tip, candidate_time, &self.params)
            .map_err(|e| JsValue::from_str(&format!("{}", e)))
    }
}

/// A JS number as a header timestamp.
fn header_time(time: f64) -> Result<u32, JsValue> {
    if time.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&time) {
        return Err(JsValue::from_str(&format!("Invalid candidate time: {}", time)));
    }
    Ok(time as u32)
}
