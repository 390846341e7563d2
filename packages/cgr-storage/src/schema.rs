pub fn render_schema() -> String {
	let init = include_str!("../../../sql/init.sql");

	expand_includes(init)
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_molecule_structures.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_molecule_structures.sql")),
				"tables/002_reaction_indexes.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_reaction_indexes.sql")),
				"tables/003_molecule_search_cache.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_molecule_search_cache.sql")),
				"tables/004_reaction_search_cache.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_reaction_search_cache.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
