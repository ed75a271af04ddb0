use super::*;

#[test]
fn base_with_api_segment_is_not_prefixed_again() {
    let base = BackendBase::new("https://localhost:7241/api");
    assert_eq!(
        build_backend_url(&base, "Cliente/GetCliente"),
        "https://localhost:7241/api/Cliente/GetCliente"
    );
}

#[test]
fn already_prefixed_path_is_not_prefixed_again() {
    let base = BackendBase::new("https://localhost:7241/api");
    assert_eq!(
        build_backend_url(&base, "api/Veiculo"),
        "https://localhost:7241/api/Veiculo"
    );

    let bare = BackendBase::new("https://localhost:7241");
    assert_eq!(
        build_backend_url(&bare, "API/Veiculo"),
        "https://localhost:7241/API/Veiculo"
    );
}

#[test]
fn api_prefix_on_both_sides_is_merged() {
    let base = BackendBase::new("https://sigo.example.com/v1/API");
    assert_eq!(
        build_backend_url(&base, "api/Veiculo/placa/ABC1234"),
        "https://sigo.example.com/v1/API/Veiculo/placa/ABC1234"
    );
    assert_eq!(
        build_backend_url(&base, "/Api/Cor"),
        "https://sigo.example.com/v1/API/Cor"
    );

    let opaque = BackendBase::new("localhost:7241/api");
    assert_eq!(build_backend_url(&opaque, "api/Cor"), "localhost:7241/api/Cor");
}

#[test]
fn bare_base_gets_api_prefix() {
    let base = BackendBase::new("http://10.0.0.5:5000/");
    assert_eq!(
        build_backend_url(&base, "/Marca/7"),
        "http://10.0.0.5:5000/api/Marca/7"
    );
}

#[test]
fn api_segment_detection_is_case_insensitive() {
    let base = BackendBase::new("https://sigo.example.com/v1/API");
    assert_eq!(
        build_backend_url(&base, "Cor"),
        "https://sigo.example.com/v1/API/Cor"
    );
}

#[test]
fn api_must_be_a_whole_segment() {
    let base = BackendBase::new("https://sigo.example.com/apis");
    assert_eq!(
        build_backend_url(&base, "Cor"),
        "https://sigo.example.com/apis/api/Cor"
    );
}

#[test]
fn leading_slashes_in_path_are_stripped() {
    let base = BackendBase::new("https://localhost:7241/api");
    assert_eq!(
        build_backend_url(&base, "///Veiculo/placa/ABC1234"),
        "https://localhost:7241/api/Veiculo/placa/ABC1234"
    );
}

#[test]
fn double_slashes_in_base_path_are_collapsed() {
    let base = BackendBase::new("https://host//api");
    assert_eq!(
        build_backend_url(&base, "Cliente"),
        "https://host/api/Cliente"
    );
}

#[test]
fn collapse_preserves_scheme_separator() {
    assert_eq!(
        collapse_slashes("https://host//api///Cliente"),
        "https://host/api/Cliente"
    );
    assert_eq!(collapse_slashes("http://a/b"), "http://a/b");
    assert_eq!(collapse_slashes("//leading//x"), "//leading/x");
}

#[test]
fn building_is_idempotent_for_fixed_inputs() {
    let base = BackendBase::new("https://localhost:7241/api");
    for path in ["Cliente/GetClienteById42", "api/Cliente/GetClienteById42"] {
        let first = build_backend_url(&base, path);
        let second = build_backend_url(&base, path);
        assert_eq!(first, second);
        assert!(!first.contains("api/api"), "{first}");
    }
}

#[test]
fn unparseable_base_degrades_to_string_concatenation() {
    let base = BackendBase::new("localhost:7241/api");
    assert!(!base.is_well_formed());
    assert_eq!(
        build_backend_url(&base, "Cor"),
        "localhost:7241/api/Cor"
    );

    let without_api = BackendBase::new("not a url");
    assert_eq!(build_backend_url(&without_api, "Cor"), "not a url/api/Cor");
}
