//! # Link-Back Script
//!
//! `contract.<method>(itemName, "<container>/<object>")` with all call flags.

use crate::domain::StoredArtifact;
use shared_types::{ContractParam, ScriptBuilder, ScriptHash};

const CALL_FLAGS_ALL: u8 = 0x0F;

/// Script recording `artifact` as `item_name`'s address.
pub fn build_link_script(
    contract: &ScriptHash,
    method: &str,
    item_name: &str,
    artifact: &StoredArtifact,
) -> Vec<u8> {
    ScriptBuilder::new()
        .contract_call(
            contract,
            method,
            CALL_FLAGS_ALL,
            &[
                ContractParam::String(item_name.to_string()),
                ContractParam::String(artifact.to_string()),
            ],
        )
        .build()
}
