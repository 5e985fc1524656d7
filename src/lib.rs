// Biblioteca do exportador Wrike
// Expõe módulos para uso em testes e no binário

pub mod config;
pub mod output;
pub mod utils;
