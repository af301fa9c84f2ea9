pub mod bus;
pub mod cartridge;
pub mod random;
pub mod serializer;
pub mod settings;
pub mod tracer;
