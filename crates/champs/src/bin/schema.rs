fn main() {
    let schema = champs::graphql::schema();

    let result = schema.as_sdl();

    std::fs::write("schema.gql", result).expect("Unable to write schema file");
}
