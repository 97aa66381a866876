use grid_dijkstra::Pathfinder;
use grid_dijkstra_levels::{load_level, render_level, save_level_costs, LoadError};

// Finds the route between two waypoints of a level and writes the cost of reaching every cell
// from the first waypoint to a CSV file. In the printed level
// - # marks a wall
// - letters mark waypoints
// - digits mark heavier terrain, . is terrain of weight 1
// - * marks the route
//
// Nodes have an 8-neighborhood

fn main() -> Result<(), LoadError> {
    let (filename, src_waypoint, dst_waypoint) = ("demos/levels/example.txt", 'a', 'e');

    let pathfinder = Pathfinder::new(load_level(filename)?);
    println!("{}", render_level(pathfinder.level(), None));

    match pathfinder.route_with_cost(src_waypoint, dst_waypoint)? {
        Some((path, cost)) => {
            println!("{}", render_level(pathfinder.level(), Some(path.as_slice())));
            println!("Path cost: {cost:.3}");
        }
        None => println!("No path possible!"),
    }

    let costs = pathfinder.costs_from(src_waypoint)?;
    save_level_costs(&costs, "my_costs.csv")?;
    println!("Saved the cost to {} cells to my_costs.csv", costs.len());
    Ok(())
}
