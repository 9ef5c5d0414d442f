//! YAML program dumps as the container format.

use dexpatch_ir::Program;
use dexpatch_patch::{ProgramDecoder, ProgramEncoder};

pub struct YamlCodec;

impl ProgramDecoder for YamlCodec {
    type Error = serde_yaml::Error;

    fn decode(&self, bytes: &[u8]) -> Result<Program, Self::Error> {
        serde_yaml::from_slice(bytes)
    }
}

impl ProgramEncoder for YamlCodec {
    type Error = serde_yaml::Error;

    fn encode(&self, program: &Program) -> Result<Vec<u8>, Self::Error> {
        serde_yaml::to_string(program).map(String::into_bytes)
    }
}
