fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_build::configure()
        .compile_well_known_types(true)
        .compile(&["proto/pong.proto"], &["proto"])?;
    Ok(())
}
