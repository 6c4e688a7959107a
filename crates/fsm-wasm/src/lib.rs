// WASM bindings for the FSM parser.
//
// Provides a `WasmMealy` class exported via wasm-bindgen that parses an FSM
// source into a Mealy machine with string labels. Transition listings are
// serialized to JavaScript values using serde-wasm-bindgen.
//
// Usage from JavaScript:
//
//   const mealy = new WasmMealy(source, false);  // direct edge semantics
//   mealy.size;                  // => 3
//   mealy.initialState;          // => 0
//   mealy.inputs();              // => ["coin", "push"]
//   mealy.transitions();         // => [{ from: 0, input: "coin", output: "ok", to: 1 }, ...]
//   mealy.trace("coin push");    // => ["ok", "open"]
//   mealy.toEtf();               // => "begin state\n..."

use serde::Serialize;
use wasm_bindgen::prelude::*;

use fsm_core::CompactMealy;
use fsm_io::{EdgeSemantics, FsmError, parse_mealy_str};

// ============================================================================
// Serde-serializable DTO types for JS interop
// ============================================================================

/// Serializable representation of a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsTransition {
    from: usize,
    input: String,
    output: String,
    to: usize,
}

fn fsm_error_to_js(e: FsmError) -> JsError {
    JsError::new(&e.to_string())
}

// ============================================================================
// WasmMealy
// ============================================================================

/// A Mealy machine parsed from an FSM source.
#[wasm_bindgen]
pub struct WasmMealy {
    mealy: CompactMealy<String, String>,
}

impl WasmMealy {
    /// Parse `source` without going through JavaScript error values.
    pub fn from_source(source: &str, alternating: bool) -> Result<Self, FsmError> {
        let semantics = if alternating {
            EdgeSemantics::Alternating
        } else {
            EdgeSemantics::Direct
        };
        let mealy = parse_mealy_str(source, semantics)?;
        Ok(WasmMealy { mealy })
    }

    fn transition_list(&self) -> Vec<JsTransition> {
        self.mealy
            .transitions()
            .map(|(from, input, t)| JsTransition {
                from,
                input: input.clone(),
                output: t.output.clone(),
                to: t.successor,
            })
            .collect()
    }
}

#[wasm_bindgen]
impl WasmMealy {
    /// Parse an FSM source.
    ///
    /// - `source`: the FSM text
    /// - `alternating`: read transition lines with alternating edge semantics
    ///   (`<from> <to> "<label>"`) instead of direct ones
    ///   (`<from> <to> "<input>" "<output>"`)
    #[wasm_bindgen(constructor)]
    pub fn new(source: &str, alternating: bool) -> Result<WasmMealy, JsError> {
        Self::from_source(source, alternating).map_err(fsm_error_to_js)
    }

    #[wasm_bindgen(getter)]
    pub fn size(&self) -> usize {
        self.mealy.size()
    }

    #[wasm_bindgen(getter, js_name = "initialState")]
    pub fn initial_state(&self) -> Option<usize> {
        self.mealy.initial_state()
    }

    /// Input symbols in alphabet order.
    pub fn inputs(&self) -> Vec<String> {
        self.mealy.input_alphabet().iter().cloned().collect()
    }

    /// All defined transitions as `{ from, input, output, to }` objects.
    pub fn transitions(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(&self.transition_list())
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Run a whitespace-separated input word from the initial state.
    ///
    /// Returns the output word, or `undefined` when some transition along
    /// the way is missing.
    pub fn trace(&self, word: &str) -> Option<Vec<String>> {
        let inputs: Vec<String> = word.split_whitespace().map(str::to_string).collect();
        self.mealy.compute_output(&inputs)
    }

    /// Serialize the machine as ETF.
    #[wasm_bindgen(js_name = "toEtf")]
    pub fn to_etf(&self) -> String {
        fsm_io::etf::to_etf_string(&self.mealy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TURNSTILE: &str = "---\nstart\nlocked\nidle\n---\n\
        0 1 \"coin\" \"ok\"\n1 2 \"push\" \"open\"\n2 1 \"coin\" \"ok\"\n1 1 \"coin\" \"refund\"\n";

    #[test]
    fn parse_and_query() {
        let mealy = WasmMealy::from_source(TURNSTILE, false).unwrap();
        assert_eq!(mealy.size(), 3);
        assert_eq!(mealy.initial_state(), Some(0));
        assert_eq!(mealy.inputs(), vec!["coin", "push"]);
        assert_eq!(
            mealy.trace("coin  push\tcoin"),
            Some(vec!["ok".to_string(), "open".to_string(), "ok".to_string()])
        );
        assert_eq!(mealy.trace("push"), None);
        assert_eq!(mealy.trace(""), Some(vec![]));
    }

    #[test]
    fn transition_listing() {
        let mealy = WasmMealy::from_source(TURNSTILE, false).unwrap();
        let list = mealy.transition_list();
        assert_eq!(list.len(), 4);
        assert_eq!(
            list[0],
            JsTransition {
                from: 0,
                input: "coin".to_string(),
                output: "ok".to_string(),
                to: 1,
            }
        );
    }

    #[test]
    fn alternating_source() {
        let mealy = WasmMealy::from_source("---\n\n\n\n---\n0 1 \"a\"\n1 2 \"x\"\n", true).unwrap();
        assert_eq!(mealy.trace("a"), Some(vec!["x".to_string()]));
        assert!(mealy.to_etf().contains("begin trans\n0/1 0 0\nend trans\n"));
    }

    #[test]
    fn parse_errors_keep_their_message() {
        let err = WasmMealy::from_source("---\n\n\n---\n", false).err().unwrap();
        assert!(err.to_string().starts_with("multiple initial states found"));
    }
}
