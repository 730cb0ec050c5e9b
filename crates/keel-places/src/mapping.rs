//! Place-type → MCC/category mapping.
//!
//! Categories are lowercase and match the reward-table category names. The
//! first place type with a mapping wins; unmapped types yield neither an
//! MCC nor a category.

/// Map place types to an MCC code and reward category.
pub fn map_types_to_mcc_category(types: &[String]) -> (Option<String>, Option<String>) {
    for place_type in types {
        if let Some((mcc, category)) = lookup(place_type) {
            return (Some(mcc.to_string()), Some(category.to_string()));
        }
    }
    (None, None)
}

fn lookup(place_type: &str) -> Option<(&'static str, &'static str)> {
    let mapped = match place_type {
        // Dining and food
        "restaurant" => ("5812", "dining"),
        "meal_takeaway" | "meal_delivery" => ("5812", "dining"),
        "cafe" | "coffee_shop" | "bakery" => ("5814", "dining"),
        // Grocery
        "grocery_or_supermarket" | "supermarket" | "convenience_store" => ("5411", "grocery"),
        // Gas
        "gas_station" => ("5541", "gas"),
        // Travel and lodging
        "lodging" | "hotel" => ("7011", "travel"),
        "travel_agency" => ("4722", "travel"),
        // Retail
        "department_store" => ("5311", "department_store"),
        "clothing_store" | "shoe_store" | "electronics_store" | "store" => ("5999", "retail"),
        // Entertainment
        "movie_theater" => ("7832", "entertainment"),
        // Health
        "pharmacy" => ("5912", "healthcare"),
        _ => return None,
    };
    Some(mapped)
}
