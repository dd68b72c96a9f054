fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Supply a protoc binary when the environment does not provide one.
    if std::env::var_os("PROTOC").is_none() {
        std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }

    // Compile proto files
    tonic_build::configure()
        .build_server(false)
        .build_client(true)
        .compile(
            &["../proto/services/feedback_reader.proto"],
            &["../proto/services"],
        )?;
    Ok(())
}
