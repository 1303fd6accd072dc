//! Small built-in tables used when no data file is given.

use polars::prelude::*;

pub fn gapminder() -> PolarsResult<DataFrame> {
    df!(
        "country" => [
            "Chile", "Japan", "Kuwait", "Nigeria", "Norway",
            "Chile", "Japan", "Kuwait", "Nigeria", "Norway",
        ],
        "continent" => [
            "Americas", "Asia", "Asia", "Africa", "Europe",
            "Americas", "Asia", "Asia", "Africa", "Europe",
        ],
        "year" => [
            1952_i64, 1952, 1952, 1952, 1952,
            2007, 2007, 2007, 2007, 2007,
        ],
        "pop" => [
            6_377_619_i64, 86_459_025, 160_000, 33_119_096, 3_327_728,
            16_284_741, 127_467_972, 2_505_559, 135_031_164, 4_627_926,
        ],
        "gdpPercap" => [
            3939.98_f64, 3216.96, 108382.35, 1077.28, 10095.42,
            13171.64, 31656.07, 47306.99, 2013.98, 49357.19,
        ],
    )
}

pub fn iris() -> PolarsResult<DataFrame> {
    df!(
        "sepal_length" => [5.1_f64, 4.9, 7.0, 6.4, 6.3, 5.8],
        "sepal_width" => [3.5_f64, 3.0, 3.2, 3.2, 3.3, 2.7],
        "petal_length" => [1.4_f64, 1.4, 4.7, 4.5, 6.0, 5.1],
        "petal_width" => [0.2_f64, 0.2, 1.4, 1.5, 2.5, 1.9],
        "species" => ["setosa", "setosa", "versicolor", "versicolor", "virginica", "virginica"],
    )
}
