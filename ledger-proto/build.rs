fn main() -> Result<(), Box<dyn std::error::Error>> {
    let descriptor_path = std::path::PathBuf::from(std::env::var("OUT_DIR")?).join("ledger_descriptor.bin");

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_well_known_types(true)
        .file_descriptor_set_path(&descriptor_path)
        .compile(&["proto/ledger/v1/ledger.proto"], &["proto"])?;

    println!("cargo:rerun-if-changed=proto/ledger/v1/ledger.proto");
    Ok(())
}
